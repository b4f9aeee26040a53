//! Candidate (subject, object) generation from the mentions of one sentence.
//!
//! Every ordered pair of distinct mentions is considered and run through a
//! fixed decision table:
//!
//! | subject  | object     | decision                          |
//! |----------|------------|-----------------------------------|
//! | person   | person     | keep, both directions are emitted |
//! | person   | non-person | keep                              |
//! | non-person | person   | drop                              |
//! | non-person | non-person | drop                            |
//!
//! `TIME` mentions never take part in pairing.

use serde::{Deserialize, Serialize};

use super::{
    ner::{EntityMention, EntityType},
    relclf::RelationCandidate,
};

/// Argument role sent to the relation classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityRole {
    Person,
    Place,
    Generic,
}

impl EntityRole {
    /// Part-of-speech tag the relation model was trained with.
    pub fn pos_tag(self) -> &'static str {
        match self {
            EntityRole::Person => "nh",
            EntityRole::Place => "ns",
            EntityRole::Generic => "n",
        }
    }

    /// Inverse of [`EntityRole::pos_tag`]; unknown tags are generic.
    pub fn from_pos_tag(tag: &str) -> Self {
        match tag.trim() {
            "nh" | "person" => EntityRole::Person,
            "ns" | "place" => EntityRole::Place,
            _ => EntityRole::Generic,
        }
    }

    pub fn is_person(self) -> bool {
        self == EntityRole::Person
    }
}

impl From<EntityType> for EntityRole {
    fn from(value: EntityType) -> Self {
        match value {
            EntityType::Person => EntityRole::Person,
            EntityType::Location => EntityRole::Place,
            EntityType::Time | EntityType::Other => EntityRole::Generic,
        }
    }
}

/// Whether a relation may be posited from `subject` to `object`.
pub fn keep_pair(subject: EntityRole, object: EntityRole) -> bool {
    match (subject.is_person(), object.is_person()) {
        (true, _) => true,
        // a place or thing is never the agent acting on a person
        (false, true) => false,
        (false, false) => false,
    }
}

/// Build the ordered candidate list for `sentence`.
///
/// Output order follows the outer loop over subjects, then objects, in
/// mention order. Two mentions with the same surface word but different
/// types still form a pair.
pub fn generate_candidates(sentence: &str, mentions: &[EntityMention]) -> Vec<RelationCandidate> {
    let pairable: Vec<&EntityMention> = mentions
        .iter()
        .filter(|mention| mention.entity_type != EntityType::Time)
        .collect();

    let mut candidates = Vec::new();
    for (i, subject) in pairable.iter().enumerate() {
        let subject_role = EntityRole::from(subject.entity_type);
        for (j, object) in pairable.iter().enumerate() {
            if i == j {
                continue;
            }
            let object_role = EntityRole::from(object.entity_type);
            if !keep_pair(subject_role, object_role) {
                continue;
            }
            candidates.push(RelationCandidate {
                sentence: sentence.to_string(),
                subject_word: subject.word.clone(),
                subject_role,
                object_word: object.word.clone(),
                object_role,
            });
        }
    }
    candidates
}

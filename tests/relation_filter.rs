use guji_relex::nlp::relclf::{is_valid_relation, NO_RELATION_LABELS};

#[test]
fn no_relation_labels_are_rejected() {
    for label in NO_RELATION_LABELS {
        assert!(!is_valid_relation(label), "{label} should be rejected");
    }
    assert!(!is_valid_relation(""));
    assert!(!is_valid_relation("   "));
}

#[test]
fn real_predicates_pass() {
    for label in ["对手", "父子", "占领", "君臣"] {
        assert!(is_valid_relation(label), "{label} should pass");
    }
}

#[test]
fn filter_is_exact_match_not_substring() {
    assert!(is_valid_relation("Other"));
    assert!(is_valid_relation("其他人"));
}

use guji_relex::{
    config::Settings,
    error::ModelError,
    nlp::{
        client::ModelClient,
        eri::{EventRelationClassifier, TriggerPair},
        ner::{EntityMention, EntityType, Ner},
        pairs::EntityRole,
        relclf::{RelationCandidate, RelationClassifier},
    },
};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

const RIVALS: &str = "项羽和刘邦是对手。";

fn client_for(server: &MockServer) -> ModelClient {
    let settings = Settings {
        ner_url: format!("{}/ner", server.uri()),
        relation_url: format!("{}/relation", server.uri()),
        event_relation_url: format!("{}/eri/", server.uri()),
        model_timeout_secs: 1,
        ..Settings::default()
    };
    ModelClient::new(&settings).unwrap()
}

fn rivals() -> RelationCandidate {
    RelationCandidate {
        sentence: RIVALS.to_string(),
        subject_word: "项羽".to_string(),
        subject_role: EntityRole::Person,
        object_word: "刘邦".to_string(),
        object_role: EntityRole::Person,
    }
}

#[tokio::test]
async fn ner_payload_is_flattened_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ner"))
        .and(body_json(json!({ "text": RIVALS })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "msg": "ok",
            "data": { "entities": { "PER": ["项羽", "刘邦", "项羽"], "TIME": ["是时"] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mentions = client_for(&server).extract(RIVALS).await.unwrap();

    assert_eq!(
        mentions,
        vec![
            EntityMention::new("项羽", EntityType::Person),
            EntityMention::new("刘邦", EntityType::Person),
            EntityMention::new("是时", EntityType::Time),
        ]
    );
}

#[tokio::test]
async fn ner_error_code_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 500,
            "msg": "model busy"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).extract(RIVALS).await.unwrap_err();

    match err {
        ModelError::Rejected { endpoint, message } => {
            assert!(endpoint.ends_with("/ner"));
            assert_eq!(message, "model busy");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn relation_request_uses_pos_tags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/relation"))
        .and(body_json(json!({
            "text": RIVALS,
            "subject_word": "项羽",
            "subject_pos": "nh",
            "object_word": "刘邦",
            "object_pos": "nh"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "predicted_relation": "对手",
                "probabilities": { "对手": 0.91, "无关系": 0.09 }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let prediction = RelationClassifier::classify(&client, &rivals()).await.unwrap();

    assert_eq!(prediction.predicted_relation, "对手");
    let labels: Vec<&str> = prediction.probabilities.keys().map(String::as_str).collect();
    assert_eq!(labels, vec!["对手", "无关系"]);
}

#[tokio::test]
async fn relation_error_status_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/relation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "error": "model not loaded"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = RelationClassifier::classify(&client, &rivals()).await.unwrap_err();

    assert!(matches!(err, ModelError::Rejected { ref message, .. } if message == "model not loaded"));
}

#[tokio::test]
async fn http_failure_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/relation"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = RelationClassifier::classify(&client, &rivals()).await.unwrap_err();

    assert!(matches!(err, ModelError::Status { status: 500, .. }));
}

#[tokio::test]
async fn undecodable_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ner"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).extract(RIVALS).await.unwrap_err();

    assert!(matches!(err, ModelError::Malformed { .. }));
}

#[tokio::test]
async fn slow_model_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ner"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": 200, "data": { "entities": {} } }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).extract(RIVALS).await.unwrap_err();

    assert!(matches!(err, ModelError::Timeout { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn event_prediction_echoes_the_pair() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/eri/predict"))
        .and(body_json(json!({
            "text": "项羽破秦军，遂入关。",
            "head_trigger": "破",
            "tail_trigger": "入"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "predicted_relation": "因果",
            "probabilities": { "因果": 0.8 }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let pair = TriggerPair::new("项羽破秦军，遂入关。", "破", "入");
    let prediction = EventRelationClassifier::classify(&client, &pair).await.unwrap();

    assert_eq!(prediction.head_trigger, "破");
    assert_eq!(prediction.tail_trigger, "入");
    assert_eq!(prediction.predicted_relation, "因果");
    assert_eq!(prediction.probabilities.get("因果"), Some(&0.8));
}

#[tokio::test]
async fn event_batch_keeps_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/eri/predict_batch"))
        .and(body_json(json!({
            "samples": [
                { "original_text": "甲乙。", "head_trigger": "甲", "tail_trigger": "乙" },
                { "original_text": "丙丁。", "head_trigger": "丙", "tail_trigger": "丁" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "results": [
                { "predicted_relation": "先后", "probabilities": { "先后": 0.7 } },
                { "text": "丙丁。", "head_trigger": "丙", "tail_trigger": "丁", "predicted_relation": "无关系" }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let pairs = [TriggerPair::new("甲乙。", "甲", "乙"), TriggerPair::new("丙丁。", "丙", "丁")];
    let predictions = client.classify_batch(&pairs).await.unwrap();

    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0].text, "甲乙。");
    assert_eq!(predictions[0].head_trigger, "甲");
    assert_eq!(predictions[0].predicted_relation, "先后");
    assert_eq!(predictions[1].predicted_relation, "无关系");
    assert!(predictions[1].probabilities.is_empty());
}

#[tokio::test]
async fn event_batch_length_mismatch_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/eri/predict_batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "results": [ { "predicted_relation": "先后" } ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let pairs = [TriggerPair::new("甲乙。", "甲", "乙"), TriggerPair::new("丙丁。", "丙", "丁")];
    let err = client.classify_batch(&pairs).await.unwrap_err();

    assert!(matches!(err, ModelError::Malformed { .. }));
}

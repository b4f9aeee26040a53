use guji_relex::{
    data::{parse_sentences, CorpusSource, FileCorpusSource, InMemoryCorpusSource},
    error::CorpusError,
};
use tempfile::TempDir;

#[test]
fn json_array_uses_content_then_text() {
    let raw = r#"[{"index":1,"content":"项羽和刘邦是对手。"},{"text":"咸阳被占领。"},{"content":""}]"#;
    assert_eq!(
        parse_sentences(raw),
        vec!["项羽和刘邦是对手。".to_string(), "咸阳被占领。".to_string()]
    );
}

#[test]
fn plain_text_is_split_on_lines() {
    let raw = "  沛公军霸上。\n\n沛公欲王关中。  \r\n";
    assert_eq!(
        parse_sentences(raw),
        vec!["沛公军霸上。".to_string(), "沛公欲王关中。".to_string()]
    );
}

#[test]
fn broken_json_falls_back_to_lines() {
    let raw = "[not json\n第二行";
    assert_eq!(parse_sentences(raw), vec!["[not json".to_string(), "第二行".to_string()]);
}

#[tokio::test]
async fn file_source_prefers_json_export() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("7.json"), r#"[{"content":"甲"},{"content":"乙"}]"#).unwrap();
    std::fs::write(dir.path().join("7.txt"), "丙\n").unwrap();
    std::fs::write(dir.path().join("8.txt"), "丁\n戊\n").unwrap();

    let source = FileCorpusSource::new(dir.path());
    assert_eq!(source.sentences(7).await.unwrap(), vec!["甲", "乙"]);
    assert_eq!(source.sentences(8).await.unwrap(), vec!["丁", "戊"]);
}

#[tokio::test]
async fn missing_corpus_is_not_found() {
    let dir = TempDir::new().unwrap();
    let source = FileCorpusSource::new(dir.path());
    assert!(matches!(source.sentences(42).await, Err(CorpusError::NotFound(42))));

    let memory = InMemoryCorpusSource::new();
    assert!(matches!(memory.sentences(1).await, Err(CorpusError::NotFound(1))));
}

#[tokio::test]
async fn non_utf8_corpus_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("3.txt"), [0xff, 0xfe, 0x00]).unwrap();
    let source = FileCorpusSource::new(dir.path());
    assert!(matches!(source.sentences(3).await, Err(CorpusError::Parse { id: 3, .. })));
}

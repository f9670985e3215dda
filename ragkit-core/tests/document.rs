use std::collections::HashMap;

use ragkit_core::{Document, Value};

#[test]
fn document_roundtrip() {
    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), Value::String("unit".to_string()));

    let doc = Document {
        id: "doc-1".to_string(),
        content: "hello".to_string(),
        metadata,
        embedding: Some(vec![1.0, 0.0, 0.0]),
    };

    let json = serde_json::to_string(&doc).unwrap();
    let parsed: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(doc, parsed);
}

#[test]
fn document_source_reads_string_metadata_only() {
    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), Value::String("a.pdf".to_string()));
    let doc = Document {
        id: "a.pdf:0".to_string(),
        content: String::new(),
        metadata,
        embedding: None,
    };
    assert_eq!(doc.source(), Some("a.pdf"));

    let mut null_source = doc.clone();
    null_source
        .metadata
        .insert("source".to_string(), Value::Null);
    assert_eq!(null_source.source(), None);
}

use std::collections::HashMap;

use ragkit_core::{Document, Value, SOURCE_KEY};

/// Keeps only the content and `source` metadata of each document.
///
/// A document without a `source` entry maps to `source: null` rather than an
/// error. Ids are carried over; embeddings are dropped.
pub fn filter_to_minimal_doc(docs: &[Document]) -> Vec<Document> {
    docs.iter()
        .map(|doc| {
            let source = doc.metadata.get(SOURCE_KEY).cloned().unwrap_or(Value::Null);
            Document {
                id: doc.id.clone(),
                content: doc.content.clone(),
                metadata: HashMap::from([(SOURCE_KEY.to_string(), source)]),
                embedding: None,
            }
        })
        .collect()
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Value;

/// Metadata key holding the path a document was loaded from.
pub const SOURCE_KEY: &str = "source";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: HashMap<String, Value>,
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    /// The `source` metadata entry, or `None` when absent or not a string.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(Value::as_str)
    }
}

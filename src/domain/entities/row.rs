use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Records shown in a list view carry the unpaginated match count.
pub trait TotalCount {
    fn total_count(&self) -> i64;
}

/// A fetched record: arbitrary fields plus the denormalized `totalCount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "totalCount")]
    pub total_count: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Row {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Field rendered as plain text; missing and null fields are empty.
    pub fn field_text(&self, name: &str) -> String {
        match self.fields.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl TotalCount for Row {
    fn total_count(&self) -> i64 {
        self.total_count
    }
}

//! Query result records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row returned by a query, keyed by field API name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw field value, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String value of a field. Null, missing and non-string fields are `None`.
    pub fn string_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.string_field("Id")
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Page of query results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub next_records_url: Option<String>,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl QueryResult {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { total_size: records.len() as u64, done: true, next_records_url: None, records }
    }
}

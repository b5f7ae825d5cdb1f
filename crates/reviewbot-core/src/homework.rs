//! Wire shapes returned by the homework status endpoint.

use serde::Deserialize;
use serde::de::Error as _;
use serde_json::Value;

/// The decoded body of a status response.
///
/// `homeworks` is kept as raw JSON so that shape problems (missing key,
/// not a list, empty list) are reported by [`crate::validate`] rather than
/// collapsing into a single decode error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Answer {
    #[serde(default)]
    pub homeworks: Option<Value>,
    /// Server time of the response, Unix seconds. Used as the next watermark.
    #[serde(default)]
    pub current_date: Option<i64>,
}

impl Answer {
    /// Decode a response body. Only a JSON object is accepted; the derived
    /// decoder alone would also fill the fields from an array by position.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        match serde_json::from_str::<Value>(body)? {
            Value::Object(map) => serde_json::from_value(Value::Object(map)),
            other => Err(serde_json::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A single homework entry: its name and raw status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeworkRecord {
    pub name: String,
    pub status: String,
}

impl HomeworkRecord {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }
}

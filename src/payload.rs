//! Response payload: the tagged shape every parsed server body takes.
//!
//! The forum server does not commit to one response shape per operation:
//! the same endpoint may answer with an object envelope, a bare list, or
//! plain text. Bodies are classified once, here, and everything downstream
//! matches on the variant.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::POST_ID_FIELDS;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Object(Map<String, Value>),
    List(Vec<Value>),
    Text(String),
}

impl Payload {
    /// Classify a raw response body.
    ///
    /// Non-JSON and empty bodies are kept verbatim as `Text`; JSON scalars
    /// other than strings become `Text` holding their JSON rendering.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(value),
            Err(_) => Self::Text(body.to_string()),
        }
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::List(items),
            Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Object(map) => Value::Object(map),
            Self::List(items) => Value::Array(items),
            Self::Text(s) => Value::String(s),
        }
    }

    /// Number of entries the payload stands for, reading `count_key` from an
    /// object envelope and the length of a bare list. Text counts as zero.
    pub fn count(&self, count_key: &str) -> u64 {
        match self {
            Self::Object(map) => map.get(count_key).and_then(Value::as_u64).unwrap_or(0),
            Self::List(items) => items.len() as u64,
            Self::Text(_) => 0,
        }
    }

    /// Entries of a list payload, or of the `list_key` array inside an
    /// object envelope. Anything else has no entries.
    pub fn entries<'a>(&'a self, list_key: &str) -> &'a [Value] {
        match self {
            Self::List(items) => items,
            Self::Object(map) => map
                .get(list_key)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            Self::Text(_) => &[],
        }
    }
}

/// Read the first present field among `fields` as a string.
/// Strings are returned as-is, numbers as their decimal text.
pub fn field_str(entry: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|f| match entry.get(*f)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Canonical post identifier of a feed or post entry.
// TODO: drop the `request_id` fallback once the server settles on one field name.
pub fn post_id(entry: &Map<String, Value>) -> Option<String> {
    field_str(entry, POST_ID_FIELDS)
}

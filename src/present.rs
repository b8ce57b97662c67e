//! Presentation adapter: one display shape for every server answer.
//!
//! Total by construction: every payload variant maps to a sequence of
//! display entries, and anything unrecognized passes through untouched.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::payload::Payload;

/// Which fixed record list entries are mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// The caller's own posts.
    OwnPost,
    /// Posts from subscribed topics (adds the publisher).
    FeedPost,
    /// Replies received on the caller's posts.
    Reply,
    /// No mapping; objects pass through.
    Generic,
}

/// (label, source field, default)
type FieldSpec = (&'static str, &'static str, &'static str);

const OWN_POST_FIELDS: &[FieldSpec] = &[
    ("id", "id", "N/A"),
    ("title", "title", "(untitled)"),
    ("content", "content", ""),
    ("topic", "topic", ""),
    ("created_at", "created_at", ""),
    ("status", "status", ""),
];

const FEED_POST_FIELDS: &[FieldSpec] = &[
    ("id", "id", "N/A"),
    ("title", "title", "(untitled)"),
    ("content", "content", ""),
    ("topic", "topic", ""),
    ("publisher", "user_id", ""),
    ("created_at", "created_at", ""),
    ("status", "status", ""),
];

const REPLY_FIELDS: &[FieldSpec] = &[
    ("id", "id", "N/A"),
    ("post_id", "request_id", "N/A"),
    ("content", "content", ""),
    ("author", "user_id", ""),
    ("created_at", "created_at", ""),
];

impl RecordKind {
    fn fields(&self) -> Option<&'static [FieldSpec]> {
        match self {
            Self::OwnPost => Some(OWN_POST_FIELDS),
            Self::FeedPost => Some(FEED_POST_FIELDS),
            Self::Reply => Some(REPLY_FIELDS),
            Self::Generic => None,
        }
    }
}

/// Fixed, ordered display record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    fields: Vec<(&'static str, String)>,
}

impl DisplayRecord {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }

}

impl Serialize for DisplayRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (label, value) in &self.fields {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEntry {
    /// A plain descriptive line (text payloads).
    Line(String),
    /// A list item mapped into the fixed record.
    Record(DisplayRecord),
    /// Passed through as received.
    Raw(Value),
}

impl Serialize for DisplayEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Line(s) => serializer.serialize_str(s),
            Self::Record(r) => r.serialize(serializer),
            Self::Raw(v) => v.serialize(serializer),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn map_record(entry: &Map<String, Value>, spec: &[FieldSpec]) -> DisplayRecord {
    let fields = spec
        .iter()
        .map(|(label, source, default)| {
            let value = entry
                .get(*source)
                .and_then(scalar_text)
                .unwrap_or_else(|| default.to_string());
            (*label, value)
        })
        .collect();
    DisplayRecord { fields }
}

/// Normalize a payload into display entries. Never fails.
pub fn normalize(payload: &Payload, kind: RecordKind) -> Vec<DisplayEntry> {
    match payload {
        Payload::Text(s) => vec![DisplayEntry::Line(s.clone())],
        Payload::Object(map) => vec![DisplayEntry::Raw(Value::Object(map.clone()))],
        Payload::List(items) => items
            .iter()
            .map(|item| match (item, kind.fields()) {
                (Value::Object(entry), Some(spec)) => DisplayEntry::Record(map_record(entry, spec)),
                (other, _) => DisplayEntry::Raw(other.clone()),
            })
            .collect(),
    }
}

/// Render entries for a terminal or a tool result.
/// A lone line prints as itself; nothing at all (or a lone `{}`) prints `empty_message`.
pub fn render(entries: &[DisplayEntry], empty_message: &str) -> String {
    match entries {
        [] => empty_message.to_string(),
        [DisplayEntry::Raw(Value::Object(map))] if map.is_empty() => empty_message.to_string(),
        [DisplayEntry::Line(line)] => line.clone(),
        [single] => pretty(single),
        many => pretty(&many),
    }
}

/// `normalize` then `render` in one step.
pub fn display(payload: &Payload, kind: RecordKind, empty_message: &str) -> String {
    render(&normalize(payload, kind), empty_message)
}

pub fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unrenderable: {}>", e))
}

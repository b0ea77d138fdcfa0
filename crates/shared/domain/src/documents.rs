//! Verification documents attached to users and role profiles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::ADDITIONAL_DOCS_KEY;
use crate::record::{is_blank, scalar_string};

/// Two-sided identity document (e.g. Aadhaar front/back).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SidedDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// Single uploaded file with a verification flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FileDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// One document entry. The backend stores several shapes under the same key,
/// so the variant is chosen by inspecting the JSON value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentValue {
    Url(String),
    Sided(SidedDocument),
    File(FileDocument),
    List(Vec<String>),
    Other(Value),
}

impl From<Value> for DocumentValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(url) => DocumentValue::Url(url),
            Value::Array(items) => {
                DocumentValue::List(items.iter().filter_map(list_entry).collect())
            }
            Value::Object(ref map) if map.contains_key("front") || map.contains_key("back") => {
                DocumentValue::Sided(SidedDocument {
                    front: map.get("front").and_then(scalar_string),
                    back: map.get("back").and_then(scalar_string),
                    verified: verified_flag(map.get("verified")),
                })
            }
            Value::Object(ref map) if map.contains_key("file") || map.contains_key("url") => {
                DocumentValue::File(FileDocument {
                    file: map
                        .get("file")
                        .or_else(|| map.get("url"))
                        .and_then(scalar_string),
                    verified: verified_flag(map.get("verified")),
                })
            }
            other => DocumentValue::Other(other),
        }
    }
}

impl<'de> Deserialize<'de> for DocumentValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(DocumentValue::from)
    }
}

fn list_entry(item: &Value) -> Option<String> {
    match item {
        Value::Object(map) => map
            .get("url")
            .or_else(|| map.get("file"))
            .and_then(scalar_string),
        other => scalar_string(other),
    }
}

fn verified_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

impl DocumentValue {
    /// Whether the entry references no file at all.
    pub fn is_blank(&self) -> bool {
        fn empty(slot: &Option<String>) -> bool {
            slot.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true)
        }

        match self {
            DocumentValue::Url(url) => url.trim().is_empty(),
            DocumentValue::Sided(doc) => empty(&doc.front) && empty(&doc.back),
            DocumentValue::File(doc) => empty(&doc.file),
            DocumentValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
            DocumentValue::Other(value) => is_blank(value),
        }
    }

    /// Whether an admin has marked the document as verified.
    pub fn is_verified(&self) -> bool {
        match self {
            DocumentValue::Sided(doc) => doc.verified,
            DocumentValue::File(doc) => doc.verified,
            _ => false,
        }
    }

    /// Every file reference carried by this entry.
    pub fn links(&self) -> Vec<String> {
        match self {
            DocumentValue::Url(url) if !url.trim().is_empty() => vec![url.clone()],
            DocumentValue::Sided(doc) => doc
                .front
                .iter()
                .chain(doc.back.iter())
                .filter(|s| !s.trim().is_empty())
                .cloned()
                .collect(),
            DocumentValue::File(doc) => doc.file.iter().cloned().collect(),
            DocumentValue::List(items) => items.clone(),
            _ => Vec::new(),
        }
    }
}

/// Document kind → entry mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Documents(BTreeMap<String, DocumentValue>);

impl Documents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any JSON value; non-objects yield an empty set.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(
                map.into_iter()
                    .map(|(kind, entry)| (kind, DocumentValue::from(entry)))
                    .collect(),
            ),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, kind: &str) -> Option<&DocumentValue> {
        self.0.get(kind)
    }

    pub fn insert(&mut self, kind: impl Into<String>, value: DocumentValue) {
        self.0.insert(kind.into(), value);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.0.get(kind).map(|v| !v.is_blank()).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DocumentValue)> {
        self.0.iter()
    }

    /// Merge `preferred` into this set; its non-blank entries win.
    ///
    /// Used when role-profile documents meet user-level documents.
    pub fn merge_preferring(&mut self, preferred: Documents) {
        for (kind, value) in preferred.0 {
            if kind == ADDITIONAL_DOCS_KEY {
                self.union_additional(value);
            } else if !value.is_blank() {
                self.0.insert(kind, value);
            } else {
                self.0.entry(kind).or_insert(value);
            }
        }
    }

    /// Merge `other` into this set; only kinds missing or blank here are taken.
    pub fn fill_from(&mut self, other: Documents) {
        for (kind, value) in other.0 {
            if kind == ADDITIONAL_DOCS_KEY {
                self.union_additional(value);
                continue;
            }
            let missing = self.0.get(&kind).map(DocumentValue::is_blank).unwrap_or(true);
            if missing && !value.is_blank() {
                self.0.insert(kind, value);
            } else {
                self.0.entry(kind).or_insert(value);
            }
        }
    }

    /// Concatenate extra uploads, keeping first occurrence of each link.
    fn union_additional(&mut self, incoming: DocumentValue) {
        let mut merged = self
            .0
            .get(ADDITIONAL_DOCS_KEY)
            .map(DocumentValue::links)
            .unwrap_or_default();
        for link in incoming.links() {
            if !merged.contains(&link) {
                merged.push(link);
            }
        }
        self.0
            .insert(ADDITIONAL_DOCS_KEY.to_string(), DocumentValue::List(merged));
    }
}

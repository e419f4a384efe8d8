//! Documents stored in a data service
//!
//! A document is a map from field name to JSON value. Nested fields are
//! addressed with dot paths (`address.city`); `_id` and `_metadata` are
//! assigned by the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{DataStackError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from any serializable value that maps to a JSON object.
    pub fn from_serializable<T: Serialize>(data: &T) -> Result<Self> {
        let value = serde_json::to_value(data)
            .map_err(|e| DataStackError::usage(format!("document is not serializable: {e}")))?;
        Self::try_from(value)
    }

    /// Server-assigned id, rendered as a string.
    pub fn id(&self) -> Option<String> {
        match self.0.get("_id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Parsed `_metadata`, if present and well-formed.
    pub fn metadata(&self) -> Option<Metadata> {
        self.0.get("_metadata").and_then(|m| serde_json::from_value(m.clone()).ok())
    }

    /// Value at a dot path, e.g. `address.city`.
    pub fn get_value(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.0.get(first)?, |current, segment| current.get(segment))
    }

    /// Set a value at a dot path, creating intermediate objects as needed.
    ///
    /// Fails when an intermediate segment holds a non-object value.
    pub fn set_value(&mut self, path: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(DataStackError::usage(format!("invalid field path '{path}'")));
        }
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| DataStackError::usage("empty field path"))?;

        let mut current = &mut self.0;
        for segment in parents {
            let entry = current
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = entry.as_object_mut().ok_or_else(|| {
                DataStackError::usage(format!("'{segment}' in '{path}' is not an object"))
            })?;
        }
        current.insert((*last).to_string(), value.into());
        Ok(self)
    }

    /// Remove the value at a dot path, returning it.
    pub fn remove_value(&mut self, path: &str) -> Option<Value> {
        match path.rsplit_once('.') {
            None => self.0.remove(path),
            Some((parent, last)) => {
                let mut segments = parent.split('.');
                let first = segments.next()?;
                let mut current = self.0.get_mut(first)?;
                for segment in segments {
                    current = current.get_mut(segment)?;
                }
                current.as_object_mut()?.remove(last)
            }
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Deserialize into a caller-defined type.
    pub fn into_typed<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|e| DataStackError::usage(format!("document does not match target type: {e}")))
    }
}

impl TryFrom<Value> for Document {
    type Error = DataStackError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(DataStackError::usage(format!(
                "document must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        Value::Object(document.0)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `_metadata` block maintained by the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<MetadataVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataVersion {
    pub document: u64,
    /// Release tag; servers send either a string or a number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<Value>,
}

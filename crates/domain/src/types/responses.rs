//! Generic response bodies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Acknowledgement returned by action endpoints (start, stop, purge...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessResponse {
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SuccessResponse {
    /// Interpret any JSON body as an acknowledgement.
    ///
    /// Non-object bodies land under `extra["body"]`.
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(map) => serde_json::from_value(Value::Object(map)).unwrap_or_default(),
            Value::Null => Self::default(),
            other => {
                let mut extra = Map::new();
                extra.insert("body".to_string(), other);
                Self { message: None, extra }
            }
        }
    }
}

/// Metadata of a file stored through `/utils/file/upload`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileUploadResponse {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FileMetadata>,
}

impl FileUploadResponse {
    /// Original file name as supplied by the uploader.
    pub fn original_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.filename.as_deref())
            .or(self.filename.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

//! Workflow actions and the response payload sent with them

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{DataStackError, Result};
use crate::impl_wire_name_conversions;
use crate::types::responses::FileUploadResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowAction {
    Discard,
    Submit,
    Rework,
    Approve,
    Reject,
}

impl_wire_name_conversions!(WorkflowAction {
    Discard => "Discard",
    Submit => "Submit",
    Rework => "Rework",
    Approve => "Approve",
    Reject => "Reject",
});

/// Remarks and attachments accompanying a workflow action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowRespond {
    remarks: Option<String>,
    attachments: Vec<FileUploadResponse>,
}

impl WorkflowRespond {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }

    pub fn set_remarks(&mut self, text: Option<String>) -> &mut Self {
        self.remarks = text;
        self
    }

    pub fn attachments(&self) -> &[FileUploadResponse] {
        &self.attachments
    }

    /// Attach a file previously stored through the upload endpoint.
    pub fn add_attachment(&mut self, file: FileUploadResponse) -> &mut Self {
        self.attachments.push(file);
        self
    }

    /// Drop attachments whose stored or original file name matches.
    pub fn remove_file(&mut self, name: &str) -> &mut Self {
        self.attachments.retain(|file| {
            file.filename.as_deref() != Some(name) && file.original_name() != Some(name)
        });
        self
    }

    /// Body for `PUT /utils/workflow/action`.
    pub fn create_payload(&self, action: WorkflowAction, ids: &[String]) -> Result<Value> {
        let attachments = serde_json::to_value(&self.attachments)
            .map_err(|e| DataStackError::usage(format!("serialize attachments: {e}")))?;
        Ok(serde_json::json!({
            "action": action.as_str(),
            "ids": ids,
            "remarks": self.remarks,
            "attachments": attachments,
        }))
    }
}

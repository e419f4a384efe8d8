//! Data service definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{DataStackError, Result};
use crate::types::role::RoleConfig;
use crate::types::schema::SchemaField;

/// A data service as stored by the service manager (`/api/a/sm/service`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataService {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// API path segment, e.g. `/employees`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    pub definition: Vec<SchemaField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub pre_hooks: Vec<WebHook>,
    pub web_hooks: Vec<WebHook>,
    pub workflow_hooks: WorkflowHooks,
    pub role: RoleConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataService {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn api(&self) -> &str {
        self.api.as_deref().unwrap_or_default()
    }

    pub fn has_draft(&self) -> bool {
        self.draft_version.is_some()
    }

    /// Shallow-merge a server response into this definition.
    ///
    /// Top-level keys present in `response` overwrite local values.
    pub fn merge_response(&mut self, response: Value) -> Result<()> {
        let Value::Object(incoming) = response else {
            return Err(DataStackError::transport("data service response is not a JSON object"));
        };
        let mut current = match serde_json::to_value(&*self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(DataStackError::transport(format!("serialize data service: {e}"))),
        };
        current.extend(incoming);
        *self = serde_json::from_value(Value::Object(current))
            .map_err(|e| DataStackError::transport(format!("invalid data service: {e}")))?;
        Ok(())
    }

    /// Body for `PUT /api/a/sm/service/{id}`.
    ///
    /// Empty `enum` and `tokens` arrays are stripped from every leaf field.
    pub fn to_update_payload(&self) -> Result<Value> {
        let mut payload = serde_json::to_value(self)
            .map_err(|e| DataStackError::usage(format!("serialize data service: {e}")))?;
        if let Some(definition) = payload.get_mut("definition") {
            clean_definition(definition);
        }
        Ok(payload)
    }
}

fn clean_definition(definition: &mut Value) {
    let Some(fields) = definition.as_array_mut() else {
        return;
    };
    for field in fields {
        let is_container = matches!(
            field.get("type").and_then(Value::as_str),
            Some("Object") | Some("Array")
        );
        if is_container {
            if let Some(children) = field.get_mut("definition") {
                clean_definition(children);
            }
            continue;
        }
        if let Some(Value::Object(properties)) = field.get_mut("properties") {
            for key in ["enum", "tokens"] {
                let empty =
                    properties.get(key).and_then(Value::as_array).is_some_and(Vec::is_empty);
                if empty {
                    properties.remove(key);
                }
            }
        }
    }
}

/// Pre-hook or post-hook (web hook) of a data service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebHook {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WebHook {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_fail_message(mut self, message: impl Into<String>) -> Self {
        self.fail_message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowHooks {
    pub post_hooks: WorkflowPostHooks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowPostHooks {
    pub approve: Vec<WebHook>,
    pub discard: Vec<WebHook>,
    pub reject: Vec<WebHook>,
    pub rework: Vec<WebHook>,
    pub submit: Vec<WebHook>,
}

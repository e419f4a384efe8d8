//! App (tenant) types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An app as returned by `/api/a/rbac/app`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct App {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_center_style: Option<AppCenterStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timezone: Option<String>,
    /// Fields this SDK does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl App {
    /// App id, or an empty string for an app not yet known to the server.
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppCenterStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_app_keeps_unknown_fields() {
        let app: App = serde_json::from_value(json!({
            "_id": "Adam",
            "appCenterStyle": {"theme": "Light", "primaryColor": "#44a8f1"},
            "type": "Management"
        }))
        .unwrap();

        assert_eq!(app.id(), "Adam");
        assert_eq!(
            app.app_center_style.as_ref().and_then(|s| s.primary_color.as_deref()),
            Some("#44a8f1")
        );
        assert_eq!(app.extra.get("type"), Some(&json!("Management")));

        let back = serde_json::to_value(&app).unwrap();
        assert_eq!(back["type"], json!("Management"));
        assert_eq!(back["_id"], json!("Adam"));
    }
}

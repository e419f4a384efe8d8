//! Role blocks of a data service

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::impl_wire_name_conversions;

/// Operations a role may be granted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoleMethod {
    Get,
    Put,
    Post,
    Delete,
    Review,
    SkipReview,
    Other(String),
}

impl_wire_name_conversions!(RoleMethod(Other) {
    Get => "GET",
    Put => "PUT",
    Post => "POST",
    Delete => "DELETE",
    Review => "REVIEW",
    SkipReview => "SKIP_REVIEW",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOperation {
    pub method: RoleMethod,
}

/// One role of a data service
///
/// Built roles always carry an id and a name; use [`RoleBlock::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBlock {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub manage_role: bool,
    #[serde(default)]
    pub view_role: bool,
    #[serde(default)]
    pub skip_review_role: bool,
    #[serde(default)]
    pub operations: Vec<RoleOperation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoleBlock {
    /// New view-only role with a generated `P##########` id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let suffix: u64 = rand::thread_rng().gen_range(1_000_000_000..10_000_000_000);
        Self {
            id: format!("P{suffix}"),
            name: Some(name.into()),
            description: None,
            manage_role: false,
            view_role: true,
            skip_review_role: false,
            operations: vec![RoleOperation { method: RoleMethod::Get }],
            extra: Map::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_description(&mut self, description: Option<String>) -> &mut Self {
        self.description = description;
        self
    }

    pub fn allows(&self, method: RoleMethod) -> bool {
        self.operations.iter().any(|op| op.method == method)
    }

    fn grant(&mut self, method: RoleMethod) -> &mut Self {
        if !self.allows(method.clone()) {
            self.operations.push(RoleOperation { method });
        }
        self.refresh_flags();
        self
    }

    fn revoke(&mut self, method: RoleMethod) -> &mut Self {
        self.operations.retain(|op| op.method != method);
        self.refresh_flags();
        self
    }

    // manageRole/viewRole/skipReviewRole mirror the granted operations
    fn refresh_flags(&mut self) {
        let managing = [RoleMethod::Post, RoleMethod::Put, RoleMethod::Delete, RoleMethod::Review];
        self.manage_role = managing.into_iter().any(|m| self.allows(m));
        self.view_role = !self.manage_role && self.allows(RoleMethod::Get);
        self.skip_review_role = self.allows(RoleMethod::SkipReview);
    }

    pub fn enable_create(&mut self) -> &mut Self {
        self.grant(RoleMethod::Post)
    }

    pub fn disable_create(&mut self) -> &mut Self {
        self.revoke(RoleMethod::Post)
    }

    pub fn enable_edit(&mut self) -> &mut Self {
        self.grant(RoleMethod::Put)
    }

    pub fn disable_edit(&mut self) -> &mut Self {
        self.revoke(RoleMethod::Put)
    }

    pub fn enable_delete(&mut self) -> &mut Self {
        self.grant(RoleMethod::Delete)
    }

    pub fn disable_delete(&mut self) -> &mut Self {
        self.revoke(RoleMethod::Delete)
    }

    pub fn enable_review(&mut self) -> &mut Self {
        self.grant(RoleMethod::Review)
    }

    pub fn disable_review(&mut self) -> &mut Self {
        self.revoke(RoleMethod::Review)
    }

    pub fn enable_skip_review(&mut self) -> &mut Self {
        self.grant(RoleMethod::SkipReview)
    }

    pub fn disable_skip_review(&mut self) -> &mut Self {
        self.revoke(RoleMethod::SkipReview)
    }
}

/// `role` section of a data service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleConfig {
    /// Field-level permission map keyed by field path
    pub fields: Map<String, Value>,
    pub roles: Vec<RoleBlock>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_role_is_view_only() {
        let role = RoleBlock::new("Viewer");

        assert!(role.id.starts_with('P'));
        assert_eq!(role.id.len(), 11);
        assert!(role.view_role);
        assert!(!role.manage_role);
        assert!(role.allows(RoleMethod::Get));
    }

    #[test]
    fn test_enable_and_disable_operations() {
        let mut role = RoleBlock::new("Editor");
        role.enable_create().enable_edit().enable_skip_review();

        assert!(role.allows(RoleMethod::Post));
        assert!(role.allows(RoleMethod::Put));
        assert!(role.manage_role);
        assert!(!role.view_role);
        assert!(role.skip_review_role);

        role.disable_create().disable_edit().disable_skip_review();
        assert!(!role.manage_role);
        assert!(role.view_role);
        assert!(!role.skip_review_role);
    }

    #[test]
    fn test_enable_is_idempotent() {
        let mut role = RoleBlock::new("Editor");
        role.enable_delete().enable_delete();
        let deletes = role.operations.iter().filter(|op| op.method == RoleMethod::Delete).count();
        assert_eq!(deletes, 1);
    }

    #[test]
    fn test_role_wire_format() {
        let role: RoleBlock = serde_json::from_value(json!({
            "id": "P1234567890",
            "name": "Skip Review",
            "manageRole": true,
            "viewRole": false,
            "skipReviewRole": true,
            "operations": [{"method": "POST"}, {"method": "SKIP_REVIEW"}]
        }))
        .unwrap();

        assert!(role.allows(RoleMethod::SkipReview));
        let back = serde_json::to_value(&role).unwrap();
        assert_eq!(back["operations"][1]["method"], json!("SKIP_REVIEW"));
        assert_eq!(back["skipReviewRole"], json!(true));
    }

    #[test]
    fn test_unlisted_method_is_kept() {
        let mut role: RoleBlock = serde_json::from_value(json!({
            "id": "P1234567890",
            "name": "Exporter",
            "operations": [{"method": "GET"}, {"method": "EXPORT"}]
        }))
        .unwrap();

        assert!(role.allows(RoleMethod::Other("EXPORT".into())));
        role.enable_create();

        let back = serde_json::to_value(&role).unwrap();
        assert_eq!(
            back["operations"],
            json!([{"method": "GET"}, {"method": "EXPORT"}, {"method": "POST"}])
        );
    }
}

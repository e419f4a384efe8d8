//! Offline editors for parts of a data service definition
//!
//! Each editor owns a copy of the relevant section. Changes become visible
//! on the service only when the editor is handed back to the data service
//! client, which merges it and saves the service.

use crate::errors::{DataStackError, Result};
use crate::types::data_service::{DataService, WebHook};
use crate::types::role::{RoleBlock, RoleConfig};
use crate::types::schema::SchemaField;

/// Editor over the `role` section of a data service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleEditor {
    config: RoleConfig,
}

impl RoleEditor {
    #[must_use]
    pub fn from_service(service: &DataService) -> Self {
        Self { config: service.role.clone() }
    }

    pub fn list_roles(&self) -> &[RoleBlock] {
        &self.config.roles
    }

    pub fn get_role(&self, name: &str) -> Option<&RoleBlock> {
        self.config.roles.iter().find(|r| r.name() == Some(name))
    }

    pub fn get_role_mut(&mut self, name: &str) -> Option<&mut RoleBlock> {
        self.config.roles.iter_mut().find(|r| r.name() == Some(name))
    }

    /// View-only role with a fresh id. Not added until [`Self::add_role`].
    #[must_use]
    pub fn create_new_role(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> RoleBlock {
        let mut role = RoleBlock::new(name);
        role.set_description(description);
        role
    }

    /// # Errors
    /// `Usage` when the role has no name.
    pub fn add_role(&mut self, role: RoleBlock) -> Result<&mut Self> {
        if role.name().map_or(true, str::is_empty) {
            return Err(DataStackError::usage("role must have a name"));
        }
        self.config.roles.push(role);
        Ok(self)
    }

    /// Remove every role with this name; unknown names are ignored.
    pub fn remove_role(&mut self, name: &str) -> &mut Self {
        self.config.roles.retain(|r| r.name() != Some(name));
        self
    }

    pub fn apply_to(self, service: &mut DataService) {
        service.role = self.config;
    }
}

/// Editor over the pre-hooks and post-hooks (`webHooks`) of a data service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrationEditor {
    pre_hooks: Vec<WebHook>,
    post_hooks: Vec<WebHook>,
}

impl IntegrationEditor {
    #[must_use]
    pub fn from_service(service: &DataService) -> Self {
        Self { pre_hooks: service.pre_hooks.clone(), post_hooks: service.web_hooks.clone() }
    }

    pub fn list_pre_hooks(&self) -> &[WebHook] {
        &self.pre_hooks
    }

    pub fn get_pre_hook(&self, name: &str) -> Option<&WebHook> {
        self.pre_hooks.iter().find(|h| h.name == name)
    }

    pub fn add_pre_hook(&mut self, hook: WebHook) -> &mut Self {
        self.pre_hooks.push(hook);
        self
    }

    pub fn remove_pre_hook(&mut self, name: &str) -> &mut Self {
        self.pre_hooks.retain(|h| h.name != name);
        self
    }

    pub fn list_post_hooks(&self) -> &[WebHook] {
        &self.post_hooks
    }

    pub fn get_post_hook(&self, name: &str) -> Option<&WebHook> {
        self.post_hooks.iter().find(|h| h.name == name)
    }

    pub fn add_post_hook(&mut self, hook: WebHook) -> &mut Self {
        self.post_hooks.push(hook);
        self
    }

    pub fn remove_post_hook(&mut self, name: &str) -> &mut Self {
        self.post_hooks.retain(|h| h.name != name);
        self
    }

    pub fn apply_to(self, service: &mut DataService) {
        service.pre_hooks = self.pre_hooks;
        service.web_hooks = self.post_hooks;
    }
}

/// Editor over the top-level fields of a data service definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaEditor {
    definition: Vec<SchemaField>,
}

impl SchemaEditor {
    #[must_use]
    pub fn from_service(service: &DataService) -> Self {
        Self { definition: service.definition.clone() }
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.definition
    }

    /// Detached `String` field named `name`.
    #[must_use]
    pub fn new_field(&self, name: impl Into<String>) -> SchemaField {
        SchemaField::new(name)
    }

    pub fn get_field(&self, name: &str) -> Option<&SchemaField> {
        self.definition.iter().find(|f| f.matches(name))
    }

    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut SchemaField> {
        self.definition.iter_mut().find(|f| f.matches(name))
    }

    pub fn add_field(&mut self, field: SchemaField) -> &mut Self {
        self.definition.push(field);
        self
    }

    /// Replace the field with the same key, or append it.
    pub fn patch_field(&mut self, field: SchemaField) -> &mut Self {
        let existing = field
            .key()
            .and_then(|key| self.definition.iter().position(|f| f.key() == Some(key)));
        match existing {
            Some(index) => self.definition[index] = field,
            None => self.definition.push(field),
        }
        self
    }

    pub fn remove_field(&mut self, name: &str) -> &mut Self {
        self.definition.retain(|f| !f.matches(name));
        self
    }

    pub fn apply_to(self, service: &mut DataService) {
        service.definition = self.definition;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::schema::SchemaFieldType;

    fn service() -> DataService {
        serde_json::from_value(json!({
            "_id": "SRVC2001",
            "name": "Employees",
            "definition": [
                {"key": "_id", "type": "String", "properties": {"name": "ID"}},
                {"key": "name", "type": "String", "properties": {"name": "Name"}}
            ],
            "preHooks": [{"name": "validate", "url": "http://hooks/validate"}],
            "webHooks": [{"name": "notify", "url": "http://hooks/notify"}],
            "role": {"roles": [
                {"id": "P1234567890", "name": "Viewer", "operations": [{"method": "GET"}]}
            ]}
        }))
        .unwrap()
    }

    #[test]
    fn role_without_name_is_rejected() {
        let mut editor = RoleEditor::from_service(&service());
        let mut role = RoleBlock::new("x");
        role.name = None;
        assert!(matches!(editor.add_role(role), Err(DataStackError::Usage(_))));
        assert_eq!(editor.list_roles().len(), 1);
    }

    #[test]
    fn roles_add_and_remove() {
        let mut service = service();
        let mut editor = RoleEditor::from_service(&service);
        let role = editor.create_new_role("Manager", Some("Can edit".into()));
        editor.add_role(role).unwrap();
        editor.remove_role("Viewer").remove_role("missing");

        assert!(editor.get_role("Manager").is_some());
        assert!(editor.get_role("Viewer").is_none());

        // Service is untouched until the editor is applied
        assert_eq!(service.role.roles.len(), 1);
        editor.apply_to(&mut service);
        assert_eq!(service.role.roles[0].name(), Some("Manager"));
    }

    #[test]
    fn hooks_edit_the_right_lists() {
        let mut service = service();
        let mut editor = IntegrationEditor::from_service(&service);
        editor
            .add_post_hook(WebHook::new("audit", "http://hooks/audit"))
            .remove_pre_hook("validate");

        assert!(editor.list_pre_hooks().is_empty());
        let audit = editor.get_post_hook("audit").map(|h| h.url.as_str());
        assert_eq!(audit, Some("http://hooks/audit"));

        editor.apply_to(&mut service);
        assert!(service.pre_hooks.is_empty());
        assert_eq!(service.web_hooks.len(), 2);
    }

    #[test]
    fn patch_replaces_same_key_or_appends() {
        let mut editor = SchemaEditor::from_service(&service());
        let mut age = editor.new_field("age");
        age.set_type(SchemaFieldType::Number);
        editor.patch_field(age);
        assert_eq!(editor.fields().len(), 3);

        let mut renamed = SchemaField::new("name");
        renamed.set_name("Full name");
        editor.patch_field(renamed);
        assert_eq!(editor.fields().len(), 3);
        assert_eq!(editor.get_field("name").and_then(SchemaField::name), Some("Full name"));

        editor.remove_field("Full name");
        assert!(editor.get_field("name").is_none());
        let age = editor.get_field("age").map(SchemaField::field_type);
        assert_eq!(age, Some(&SchemaFieldType::Number));
    }
}

//! Schema field definitions of a data service

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::impl_wire_name_conversions;

/// Field types understood by the platform
///
/// Types the SDK does not list are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SchemaFieldType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    Object,
    Array,
    Relation,
    Schema,
    Location,
    Other(String),
}

impl_wire_name_conversions!(SchemaFieldType(Other) {
    String => "String",
    Number => "Number",
    Boolean => "Boolean",
    Date => "Date",
    Object => "Object",
    Array => "Array",
    Relation => "Relation",
    Schema => "Global",
    Location => "Geojson",
});

impl SchemaFieldType {
    /// Object and Array fields carry a nested definition.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }
}

/// One field of a data service definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaField {
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(rename = "type")]
    field_type: SchemaFieldType,
    properties: SchemaFieldProperties,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    definition: Vec<SchemaField>,
}

impl SchemaField {
    /// New `String` field whose key and display name are both `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut field = Self { key: Some(name.clone()), ..Self::default() };
        field.properties.name = Some(name);
        field
    }

    /// Display name (`properties.name`).
    pub fn name(&self) -> Option<&str> {
        self.properties.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.properties.name = Some(name.into());
        self
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn set_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.key = Some(key.into());
        self
    }

    pub fn field_type(&self) -> &SchemaFieldType {
        &self.field_type
    }

    pub fn set_type(&mut self, field_type: SchemaFieldType) -> &mut Self {
        self.field_type = field_type;
        self
    }

    /// Nested fields of an Object or Array field.
    pub fn children(&self) -> &[SchemaField] {
        &self.definition
    }

    /// Append a nested field. Non-container fields become `Object`.
    pub fn add_child_field(&mut self, field: SchemaField) -> &mut Self {
        if !self.field_type.is_container() {
            self.field_type = SchemaFieldType::Object;
        }
        self.definition.push(field);
        self
    }

    /// Remove nested fields whose key or name matches.
    pub fn remove_child_field(&mut self, name: &str) -> &mut Self {
        self.definition.retain(|f| !f.matches(name));
        self
    }

    pub fn properties(&self) -> &SchemaFieldProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut SchemaFieldProperties {
        &mut self.properties
    }

    /// `true` when `name` equals this field's key or display name.
    pub fn matches(&self, name: &str) -> bool {
        self.key() == Some(name) || self.name() == Some(name)
    }
}

/// Validation and presentation properties of a schema field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaFieldProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub create_only: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub email: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub password: bool,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_field_type_wire_names() {
        assert_eq!(serde_json::to_value(SchemaFieldType::Schema).unwrap(), json!("Global"));
        assert_eq!(serde_json::to_value(SchemaFieldType::Location).unwrap(), json!("Geojson"));
        assert_eq!("geojson".parse::<SchemaFieldType>().unwrap(), SchemaFieldType::Location);
    }

    #[test]
    fn test_unlisted_field_type_round_trips() {
        let field: SchemaField = serde_json::from_value(json!({
            "key": "photo",
            "type": "File",
            "properties": {"name": "Photo", "fileType": "image"}
        }))
        .unwrap();

        assert_eq!(field.field_type(), &SchemaFieldType::Other("File".into()));
        assert!(!field.field_type().is_container());

        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back["type"], json!("File"));
        assert_eq!(back["properties"]["fileType"], json!("image"));
    }

    #[test]
    fn test_nested_definition_parses() {
        let field: SchemaField = serde_json::from_value(json!({
            "key": "address",
            "type": "Object",
            "properties": {"name": "Address"},
            "definition": [
                {"key": "city", "type": "String", "properties": {"name": "City", "required": true}}
            ]
        }))
        .unwrap();

        assert_eq!(field.field_type(), &SchemaFieldType::Object);
        assert_eq!(field.children().len(), 1);
        assert!(field.children()[0].properties().required);
        assert!(field.children()[0].matches("City"));
    }

    #[test]
    fn test_add_child_promotes_to_object() {
        let mut field = SchemaField::new("address");
        field.add_child_field(SchemaField::new("city"));
        assert_eq!(field.field_type(), &SchemaFieldType::Object);

        field.remove_child_field("city");
        assert!(field.children().is_empty());
    }

    #[test]
    fn test_false_flags_are_omitted() {
        let value = serde_json::to_value(SchemaField::new("name")).unwrap();
        assert_eq!(value, json!({"key": "name", "type": "String", "properties": {"name": "name"}}));
    }
}

//! Multi-document transactions (`/api/common/txn`)

use serde::{Deserialize, Serialize};

use crate::impl_wire_name_conversions;
use crate::types::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionMethod {
    Post,
    Put,
    Delete,
}

impl_wire_name_conversions!(TransactionMethod {
    Post => "POST",
    Put => "PUT",
    Delete => "DELETE",
});

/// Data service targeted by one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTarget {
    pub name: String,
    pub app: String,
}

/// One queued transaction operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOperation {
    pub operation: TransactionMethod,
    pub data: Document,
    pub data_service: TransactionTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsert: Option<bool>,
}

impl TransactionOperation {
    pub fn create(app: &str, service: &str, data: Document) -> Self {
        Self::build(TransactionMethod::Post, app, service, data, None)
    }

    pub fn update(app: &str, service: &str, data: Document, upsert: bool) -> Self {
        Self::build(TransactionMethod::Put, app, service, data, Some(upsert))
    }

    pub fn delete(app: &str, service: &str, data: Document) -> Self {
        Self::build(TransactionMethod::Delete, app, service, data, None)
    }

    fn build(
        operation: TransactionMethod,
        app: &str,
        service: &str,
        data: Document,
        upsert: Option<bool>,
    ) -> Self {
        Self {
            operation,
            data,
            data_service: TransactionTarget { name: service.to_string(), app: app.to_string() },
            upsert,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_operation_wire_format() {
        let doc = Document::try_from(json!({"_id": "EMP1", "name": "Jane"})).unwrap();

        let create = TransactionOperation::create("Adam", "employees", doc.clone());
        let create = serde_json::to_value(create).unwrap();
        assert_eq!(
            create,
            json!({
                "operation": "POST",
                "data": {"_id": "EMP1", "name": "Jane"},
                "dataService": {"name": "employees", "app": "Adam"}
            })
        );

        let update = TransactionOperation::update("Adam", "employees", doc, false);
        let update = serde_json::to_value(update).unwrap();
        assert_eq!(update["operation"], json!("PUT"));
        assert_eq!(update["upsert"], json!(false));
    }
}

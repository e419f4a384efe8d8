//! List options, filters and record expiry options
//!
//! Everything here is passed through to the platform as query parameters;
//! the backend interprets filters, this crate only carries them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{DataStackError, Result};

/// Query expression sent as the JSON-encoded `filter` parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Map<String, Value>);

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter from a JSON object value.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(DataStackError::usage("filter must be a JSON object")),
        }
    }

    /// Filter from a JSON object literal, e.g. `{"status": "Pending"}`.
    pub fn parse(expression: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(expression)
            .map_err(|e| DataStackError::usage(format!("filter is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON text for the `filter` query parameter.
    pub fn to_query_value(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

/// Options recognised by list endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    /// Comma-separated field list
    pub select: Option<String>,
    /// Sort expression, e.g. `-_metadata.lastUpdated`
    pub sort: Option<String>,
    pub page: Option<u32>,
    /// Page size; `-1` returns everything
    pub count: Option<i64>,
    pub filter: Option<Filter>,
    /// Expand relation fields
    pub expand: bool,
}

impl ListOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn select(mut self, fields: impl Into<String>) -> Self {
        self.select = Some(fields.into());
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }
}

/// Absolute or relative expiry for a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpireOptions {
    /// ISO timestamp or epoch millis
    pub expire_at: Option<String>,
    /// Relative duration such as `2h` or `30m`
    pub expire_after: Option<String>,
}

impl ExpireOptions {
    #[must_use]
    pub fn at(timestamp: impl ToString) -> Self {
        Self { expire_at: Some(timestamp.to_string()), expire_after: None }
    }

    #[must_use]
    pub fn after(duration: impl Into<String>) -> Self {
        Self { expire_at: None, expire_after: Some(duration.into()) }
    }

    /// Query parameters for the options that are set.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(after) = &self.expire_after {
            pairs.push(("expireAfter", after.clone()));
        }
        if let Some(at) = &self.expire_at {
            pairs.push(("expireAt", at.clone()));
        }
        pairs
    }
}

//! Atomic numeric updates applied through `PUT /{id}/math`

use serde_json::{json, Value};

use crate::errors::{DataStackError, Result};

/// Builder for an ordered list of `$inc` / `$mul` operations
///
/// A field must be selected before any operation is added:
///
/// ```
/// use datastack_domain::types::MathApi;
///
/// let mut math = MathApi::new();
/// math.select_field("salary").increment(500).unwrap().multiply(1.1).unwrap();
/// assert_eq!(math.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MathApi {
    selected_field: Option<String>,
    operations: Vec<Value>,
}

impl MathApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_field(&mut self, path: impl Into<String>) -> &mut Self {
        self.selected_field = Some(path.into());
        self
    }

    pub fn increment(&mut self, by: impl Into<serde_json::Number>) -> Result<&mut Self> {
        self.push("$inc", by.into())
    }

    pub fn multiply(&mut self, by: f64) -> Result<&mut Self> {
        let number = serde_json::Number::from_f64(by)
            .ok_or_else(|| {
                DataStackError::usage(format!("multiplier {by} is not a finite number"))
            })?;
        self.push("$mul", number)
    }

    fn push(&mut self, operator: &str, number: serde_json::Number) -> Result<&mut Self> {
        let field = self
            .selected_field
            .as_deref()
            .ok_or_else(|| {
                DataStackError::usage("select a field before applying a math operation")
            })?;
        self.operations.push(json!({ operator: { field: number } }));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Operations in the order they were added.
    pub fn create_payload(&self) -> Value {
        Value::Array(self.operations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_selected_field() {
        let mut math = MathApi::new();
        assert!(matches!(math.increment(1), Err(DataStackError::Usage(_))));
        assert!(matches!(math.multiply(2.0), Err(DataStackError::Usage(_))));
        assert!(math.is_empty());
    }

    #[test]
    fn test_payload_preserves_order() {
        let mut math = MathApi::new();
        math.select_field("salary").increment(100).unwrap();
        math.select_field("bonus").multiply(1.5).unwrap();
        math.select_field("salary").increment(-20).unwrap();

        assert_eq!(
            math.create_payload(),
            json!([
                {"$inc": {"salary": 100}},
                {"$mul": {"bonus": 1.5}},
                {"$inc": {"salary": -20}}
            ])
        );
    }

    #[test]
    fn test_multiply_rejects_nan() {
        let mut math = MathApi::new();
        math.select_field("x");
        assert!(math.multiply(f64::NAN).is_err());
    }
}

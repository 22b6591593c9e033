use serde_json::Value as JsonValue;

use super::{expect_number, Validator};
use crate::error::{Result, TransformError};

fn bound(value: Option<f64>, open: &str) -> String {
    value.map_or_else(|| open.to_string(), |v| v.to_string())
}

/// Number strictly between the bounds; a missing bound is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExclusiveRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ExclusiveRangeValidator {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

impl Validator for ExclusiveRangeValidator {
    fn validate(&self, value: &JsonValue) -> Result<()> {
        let number = expect_number(value)?;
        let above = self.min.map_or(true, |min| number > min);
        let below = self.max.map_or(true, |max| number < max);
        if !(above && below) {
            return Err(TransformError::validation(format!(
                "Value {} doesn't match to range ({}, {})",
                number,
                bound(self.min, "MIN"),
                bound(self.max, "MAX")
            )));
        }
        Ok(())
    }
}

/// Number between the bounds, bounds included; a missing bound is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InclusiveRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl InclusiveRangeValidator {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

impl Validator for InclusiveRangeValidator {
    fn validate(&self, value: &JsonValue) -> Result<()> {
        let number = expect_number(value)?;
        let above = self.min.map_or(true, |min| number >= min);
        let below = self.max.map_or(true, |max| number <= max);
        if !(above && below) {
            return Err(TransformError::validation(format!(
                "Value {} doesn't match to range [{}, {}]",
                number,
                bound(self.min, "MIN"),
                bound(self.max, "MAX")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_exclusive_bounds() {
        let validator = ExclusiveRangeValidator::new(Some(1.0), Some(3.0));
        assert!(validator.validate(&json!(2)).is_ok());
        assert!(validator.validate(&json!(1)).is_err());
        assert!(validator.validate(&json!(3)).is_err());
    }

    #[test]
    fn test_exclusive_one_sided() {
        let max_only = ExclusiveRangeValidator::new(None, Some(3.0));
        assert!(max_only.validate(&json!(-1000)).is_ok());
        assert!(max_only.validate(&json!(3)).is_err());

        let min_only = ExclusiveRangeValidator::new(Some(1.0), None);
        assert!(min_only.validate(&json!(1)).is_err());
        assert!(min_only.validate(&json!(1.5)).is_ok());
    }

    #[test]
    fn test_inclusive_bounds() {
        let validator = InclusiveRangeValidator::new(Some(1.0), Some(3.0));
        assert!(validator.validate(&json!(1)).is_ok());
        assert!(validator.validate(&json!(3)).is_ok());
        assert!(validator.validate(&json!(0)).is_err());
        let err = validator.validate(&json!(4)).unwrap_err();
        assert!(err.to_string().contains("[1, 3]"));
    }

    #[test]
    fn test_non_number_is_type_mismatch() {
        let err = InclusiveRangeValidator::new(Some(1.0), None)
            .validate(&json!("2"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }
}

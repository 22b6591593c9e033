use serde_json::Value as JsonValue;

use super::Validator;
use crate::error::{Result, TransformError};
use crate::value::json_type_name;

/// Character count of a string, or element count of an array
///
/// When `exact` is set, `min` and `max` are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthValidator {
    pub exact: Option<usize>,
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl LengthValidator {
    pub fn exact(length: usize) -> Self {
        Self {
            exact: Some(length),
            ..Default::default()
        }
    }

    pub fn between(min: Option<usize>, max: Option<usize>) -> Self {
        Self {
            exact: None,
            min,
            max,
        }
    }

    fn measure(value: &JsonValue) -> Result<usize> {
        match value {
            JsonValue::String(s) => Ok(s.chars().count()),
            JsonValue::Array(items) => Ok(items.len()),
            other => Err(TransformError::type_mismatch(
                "String or Array",
                json_type_name(other),
            )),
        }
    }
}

impl Validator for LengthValidator {
    fn validate(&self, value: &JsonValue) -> Result<()> {
        let length = Self::measure(value)?;

        if let Some(exact) = self.exact {
            if length != exact {
                return Err(TransformError::validation(format!(
                    "Value length must be exactly {}, got {}",
                    exact, length
                )));
            }
            return Ok(());
        }
        if let Some(min) = self.min {
            if length < min {
                return Err(TransformError::validation(format!(
                    "Value length must be at least {}, got {}",
                    min, length
                )));
            }
        }
        if let Some(max) = self.max {
            if length > max {
                return Err(TransformError::validation(format!(
                    "Value length must be at most {}, got {}",
                    max, length
                )));
            }
        }
        Ok(())
    }

    fn measures_size(&self) -> bool {
        true
    }
}

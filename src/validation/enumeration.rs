use serde_json::Value as JsonValue;

use super::{expect_str, Validator};
use crate::error::{Result, TransformError};

/// String must be one of a fixed list of values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationValidator {
    allowed: Vec<String>,
}

impl EnumerationValidator {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl Validator for EnumerationValidator {
    fn validate(&self, value: &JsonValue) -> Result<()> {
        let text = expect_str(value)?;
        if !self.allowed.iter().any(|allowed| allowed == text) {
            let choices = self
                .allowed
                .iter()
                .map(|v| format!("'{}'", v))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(TransformError::validation(format!(
                "Value must be one of {}",
                choices
            )));
        }
        Ok(())
    }
}

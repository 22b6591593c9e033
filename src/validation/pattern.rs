use regex::Regex;
use serde_json::Value as JsonValue;

use super::{expect_str, Validator};
use crate::error::{Result, TransformError};

/// String must match a regular expression (unanchored unless the pattern says otherwise)
#[derive(Debug, Clone)]
pub struct PatternValidator {
    pattern: Regex,
}

impl PatternValidator {
    pub fn new(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn from_regex(pattern: Regex) -> Self {
        Self { pattern }
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Validator for PatternValidator {
    fn validate(&self, value: &JsonValue) -> Result<()> {
        let text = expect_str(value)?;
        if !self.pattern.is_match(text) {
            return Err(TransformError::validation(format!(
                "Value doesn't match to pattern '{}'",
                self.pattern.as_str()
            )));
        }
        Ok(())
    }
}

//! Field Validators
//!
//! Stateless constraints checked against wire-shaped values: the incoming
//! JSON before parsing, the computed JSON before it is written out.
//!
//! ## Validators
//! 1. **Pattern**: string must match a regular expression
//! 2. **Length**: exact/min/max character count of a string, or element count
//!    of a repeated field
//! 3. **Enumeration**: string must be one of a fixed list
//! 4. **Exclusive / Inclusive range**: numeric bounds
//!
//! A value of the wrong shape for a validator (a number handed to a pattern)
//! is a type mismatch, not a validation failure.

mod enumeration;
mod length;
mod pattern;
mod range;

use std::fmt;

use serde_json::Value as JsonValue;

use crate::error::{Result, TransformError};
use crate::value::json_type_name;

pub use enumeration::EnumerationValidator;
pub use length::LengthValidator;
pub use pattern::PatternValidator;
pub use range::{ExclusiveRangeValidator, InclusiveRangeValidator};

/// A single constraint on a field value
pub trait Validator: fmt::Debug + Send + Sync {
    /// Check `value`, failing with [`TransformError::Validation`] or
    /// [`TransformError::TypeMismatch`]
    fn validate(&self, value: &JsonValue) -> Result<()>;

    /// Whether a repeated field hands this validator the whole sequence
    /// instead of each element
    fn measures_size(&self) -> bool {
        false
    }
}

fn expect_str(value: &JsonValue) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| TransformError::type_mismatch("String", json_type_name(value)))
}

fn expect_number(value: &JsonValue) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| TransformError::type_mismatch("Number", json_type_name(value)))
}

//! Checks shared by parsing and serializing
//!
//! Both directions check a field on its wire-shaped value: the incoming JSON
//! when parsing, the computed JSON when serializing. The shape check always
//! runs before the validators.

use serde_json::Value as JsonValue;

use crate::error::{Result, TransformError};
use crate::schema::FieldRule;
use crate::value::json_type_name;

/// Default recursion ceiling for nested objects
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Check that `value` has the shape `rule` declares: an array for a repeated
/// field, then the primitive kind on every element (or on the scalar).
/// Constructed kinds are checked when the nested object is transformed.
pub(crate) fn check_types(rule: &FieldRule, value: &JsonValue) -> Result<()> {
    if rule.repeated && !value.is_array() {
        return Err(TransformError::type_mismatch("Array", json_type_name(value)));
    }
    if rule.kind.is_primitive() {
        if let Some(item) = elements(value).iter().find(|item| !rule.kind.accepts(item)) {
            return Err(TransformError::type_mismatch(
                rule.kind.name(),
                json_type_name(item),
            ));
        }
    }
    Ok(())
}

/// Run the field's validators in declaration order, stopping at the first
/// failure. On a repeated field, size validators see the whole array and the
/// rest see each element.
pub(crate) fn check_values(rule: &FieldRule, value: &JsonValue) -> Result<()> {
    for validator in &rule.validators {
        if rule.repeated && !validator.measures_size() {
            for item in elements(value) {
                validator.validate(item)?;
            }
        } else {
            validator.validate(value)?;
        }
    }
    Ok(())
}

/// Shape check followed by validation
pub(crate) fn check_field(rule: &FieldRule, value: &JsonValue) -> Result<()> {
    check_types(rule, value)?;
    check_values(rule, value)
}

/// Elements of an array, or the value itself
pub(crate) fn elements(value: &JsonValue) -> &[JsonValue] {
    match value {
        JsonValue::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    }
}

pub(crate) fn check_depth(depth: usize, limit: usize) -> Result<()> {
    if depth > limit {
        return Err(TransformError::DepthExceeded { limit });
    }
    Ok(())
}

/// Depth check over an untyped subtree hanging off an instance at `depth`.
/// Each nested array or object counts one level; scalars count none.
pub(crate) fn check_tree_depth(value: &JsonValue, depth: usize, limit: usize) -> Result<()> {
    let children: Box<dyn Iterator<Item = &JsonValue>> = match value {
        JsonValue::Array(items) => Box::new(items.iter()),
        JsonValue::Object(map) => Box::new(map.values()),
        _ => return Ok(()),
    };
    check_depth(depth + 1, limit)?;
    for child in children {
        check_tree_depth(child, depth + 1, limit)?;
    }
    Ok(())
}

//! Value converters
//!
//! A converter sits between the wire value of a primitive field and what the
//! instance holds in memory. It runs after the wire value is checked when
//! parsing, and before the computed wire value is checked when serializing.
//! The owning instance is passed along for context only.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;

use crate::error::BoxError;
use crate::value::{json_type_name, Object, Value};

/// Bidirectional transform between wire and in-memory representations
pub trait Converter: Send + Sync {
    /// In-memory value to its wire form
    fn to_wire(&self, value: &Value, owner: &Object) -> Result<JsonValue, BoxError>;

    /// Wire value to its in-memory form
    fn from_wire(&self, wire: &JsonValue, owner: &Object) -> Result<Value, BoxError>;
}

type ToWireFn = dyn Fn(&Value, &Object) -> Result<JsonValue, BoxError> + Send + Sync;
type FromWireFn = dyn Fn(&JsonValue, &Object) -> Result<Value, BoxError> + Send + Sync;

/// Converter built from a pair of closures
pub struct FnConverter {
    to_wire: Box<ToWireFn>,
    from_wire: Box<FromWireFn>,
}

impl FnConverter {
    pub fn new<T, F>(to_wire: T, from_wire: F) -> Self
    where
        T: Fn(&Value, &Object) -> Result<JsonValue, BoxError> + Send + Sync + 'static,
        F: Fn(&JsonValue, &Object) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            to_wire: Box::new(to_wire),
            from_wire: Box::new(from_wire),
        }
    }
}

impl Converter for FnConverter {
    fn to_wire(&self, value: &Value, owner: &Object) -> Result<JsonValue, BoxError> {
        (self.to_wire)(value, owner)
    }

    fn from_wire(&self, wire: &JsonValue, owner: &Object) -> Result<Value, BoxError> {
        (self.from_wire)(wire, owner)
    }
}

impl fmt::Debug for FnConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnConverter")
    }
}

/// Shorthand for a shared [`FnConverter`]
pub fn converter<T, F>(to_wire: T, from_wire: F) -> Arc<dyn Converter>
where
    T: Fn(&Value, &Object) -> Result<JsonValue, BoxError> + Send + Sync + 'static,
    F: Fn(&JsonValue, &Object) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    Arc::new(FnConverter::new(to_wire, from_wire))
}

/// Integers held in memory, written as decimal strings
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerStringConverter;

impl Converter for IntegerStringConverter {
    fn to_wire(&self, value: &Value, _owner: &Object) -> Result<JsonValue, BoxError> {
        match value.as_i64() {
            Some(n) => Ok(JsonValue::String(n.to_string())),
            None => Err(format!("expected an integer, got {}", value.type_name()).into()),
        }
    }

    fn from_wire(&self, wire: &JsonValue, _owner: &Object) -> Result<Value, BoxError> {
        let text = wire
            .as_str()
            .ok_or_else(|| format!("expected a string, got {}", json_type_name(wire)))?;
        let n: i64 = text.trim().parse()?;
        Ok(Value::from(n))
    }
}

/// `DateTime<Utc>` held in memory as an opaque value, written as an RFC 3339
/// string with millisecond precision (`1970-01-01T00:00:10.000Z`)
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeConverter;

impl Converter for DateTimeConverter {
    fn to_wire(&self, value: &Value, _owner: &Object) -> Result<JsonValue, BoxError> {
        let timestamp = value
            .as_opaque::<DateTime<Utc>>()
            .ok_or_else(|| format!("expected a timestamp, got {}", value.type_name()))?;
        Ok(JsonValue::String(
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        ))
    }

    fn from_wire(&self, wire: &JsonValue, _owner: &Object) -> Result<Value, BoxError> {
        let text = wire
            .as_str()
            .ok_or_else(|| format!("expected a string, got {}", json_type_name(wire)))?;
        let timestamp = DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc);
        Ok(Value::opaque(timestamp))
    }
}

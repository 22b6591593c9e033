//! Familiar Transform
//!
//! Schema-driven transformation between an in-memory object graph and JSON
//! trees, in both directions.
//!
//! ## Features
//!
//! - **Declarative fields**: kind, optionality, defaults, repetition, wire
//!   names and validation constraints per field
//! - **Inheritance**: a derived type's schema starts as a copy of its
//!   nearest ancestor's
//! - **Views**: named variants of a schema that override or extend the
//!   default rules
//! - **Converters**: pluggable wire <-> memory transforms for leaf values
//! - **Path-aware errors**: every failure names the chain of
//!   `(schema, field)` pairs that led to it
//!
//! ## Example
//!
//! ```
//! use familiar_transform::{declare_field, from_tree, to_tree, FieldOptions, ModelType, Object};
//! use familiar_transform::{ParseOptions, SerializeOptions};
//! use serde_json::json;
//!
//! let user = ModelType::new("User");
//! declare_field(&user, "id", FieldOptions::string().pattern("^[0-9]{6}$")).unwrap();
//! declare_field(&user, "nick", FieldOptions::string().name("nickname").optional()).unwrap();
//!
//! let object = Object::new(user.clone()).with("id", "010203");
//! let tree = to_tree(&object, SerializeOptions::default()).unwrap();
//! assert_eq!(tree, json!({"id": "010203"}));
//!
//! let parsed = from_tree(&tree, &user, ParseOptions::default()).unwrap();
//! assert_eq!(parsed, object);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! declare_field ──► SchemaRegistry ──► Schema ──► views ──► FieldRule
//!                        │
//!        ┌───────────────┴───────────────┐
//!   JsonParser (tree → Object)    JsonSerializer (Value → tree)
//!        └──── classify · check_types · check_values · Converter ────┘
//! ```

pub mod classify;
pub mod config;
pub mod converter;
pub mod error;
pub mod field;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod serializer;
mod transform;
pub mod types;
pub mod validation;
pub mod value;

use serde_json::Value as JsonValue;

pub use classify::{classify, classify_type, is_convertible, Classification};
pub use config::{OutputFormat, TransformConfig};
pub use converter::{converter, Converter, DateTimeConverter, FnConverter, IntegerStringConverter};
pub use error::{BoxError, ErrorKind, PathSegment, Result, TransformError};
pub use field::FieldOptions;
pub use parser::{JsonParser, ParseOptions};
pub use registry::SchemaRegistry;
pub use schema::{FieldRule, Schema, ValueKind, DEFAULT_VIEW};
pub use serializer::{JsonSerializer, SerializeOptions};
pub use transform::DEFAULT_MAX_DEPTH;
pub use types::{Convertible, ModelType, TypeKey, TypeRef};
pub use validation::Validator;
pub use value::{FieldValues, Object, Value};

/// Declare field `key` of `owner` in the global registry
pub fn declare_field(owner: &TypeRef, key: impl Into<String>, options: FieldOptions) -> Result<()> {
    SchemaRegistry::global().declare_field(owner, key, options)
}

/// Parse JSON text into an instance of `ty` using the global registry
pub fn parse(text: &str, ty: &TypeRef, options: ParseOptions) -> Result<Object> {
    JsonParser::with_options(SchemaRegistry::global(), options).parse(text, ty)
}

/// Build an instance of `ty` from a JSON tree using the global registry
pub fn from_tree(tree: &JsonValue, ty: &TypeRef, options: ParseOptions) -> Result<Object> {
    JsonParser::with_options(SchemaRegistry::global(), options).from_tree(tree, ty)
}

/// Serialize a value to JSON text using the global registry
pub fn serialize(value: impl Into<Value>, options: SerializeOptions) -> Result<String> {
    JsonSerializer::with_options(SchemaRegistry::global(), options).serialize(&value.into())
}

/// Serialize a value to a JSON tree using the global registry
pub fn to_tree(value: impl Into<Value>, options: SerializeOptions) -> Result<JsonValue> {
    JsonSerializer::with_options(SchemaRegistry::global(), options).to_tree(&value.into())
}

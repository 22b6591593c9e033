//! Serializer: object graph to JSON tree
//!
//! Objects with a schema are written field by field under their wire names.
//! Objects and maps without one are copied key by key with no checks.
//! Convertible types write themselves.

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace};

use crate::classify::find_convertible;
use crate::config::{OutputFormat, TransformConfig};
use crate::error::{Result, TransformError};
use crate::registry::SchemaRegistry;
use crate::schema::{FieldRule, Schema, ValueKind, DEFAULT_VIEW};
use crate::transform::{check_depth, check_field, DEFAULT_MAX_DEPTH};
use crate::types::TypeRef;
use crate::value::{FieldValues, Object, Value};

/// Options for a serialize call
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// View whose rules apply; unknown views fall back to the default view
    pub view: String,
    /// Serialize the top-level value as this type instead of its own.
    /// The type must have a schema.
    pub target_type: Option<TypeRef>,
    /// Indent the JSON text
    pub pretty: bool,
    pub max_depth: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            view: DEFAULT_VIEW.to_string(),
            target_type: None,
            pretty: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SerializeOptions {
    pub fn from_config(config: &TransformConfig) -> Self {
        Self {
            view: config.serialize.default_view.clone(),
            target_type: None,
            pretty: config.serialize.output_format == OutputFormat::Pretty,
            max_depth: config.limits.max_depth,
        }
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    pub fn with_target_type(mut self, ty: &TypeRef) -> Self {
        self.target_type = Some(TypeRef::clone(ty));
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Writes values as JSON using the schemas of one registry
#[derive(Debug, Clone)]
pub struct JsonSerializer<'r> {
    registry: &'r SchemaRegistry,
    options: SerializeOptions,
}

impl<'r> JsonSerializer<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_options(registry, SerializeOptions::default())
    }

    pub fn with_options(registry: &'r SchemaRegistry, options: SerializeOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &SerializeOptions {
        &self.options
    }

    /// Serialize `value` to JSON text
    pub fn serialize(&self, value: &Value) -> Result<String> {
        let tree = self.to_tree(value)?;
        let text = if self.options.pretty {
            serde_json::to_string_pretty(&tree)?
        } else {
            serde_json::to_string(&tree)?
        };
        Ok(text)
    }

    /// Serialize `value` to a JSON tree
    pub fn to_tree(&self, value: &Value) -> Result<JsonValue> {
        debug!(
            kind = value.type_name(),
            view = %self.options.view,
            target_type = self.options.target_type.as_ref().map(|t| t.name()),
            "Serializing"
        );
        self.write_value(value, self.options.target_type.as_ref(), 0)
    }

    fn write_value(&self, value: &Value, target: Option<&TypeRef>, depth: usize) -> Result<JsonValue> {
        check_depth(depth, self.options.max_depth)?;

        match value {
            Value::Null => Ok(JsonValue::Null),
            Value::Bool(b) => Ok(JsonValue::Bool(*b)),
            Value::Number(n) => Ok(JsonValue::Number(n.clone())),
            Value::String(s) => Ok(JsonValue::String(s.clone())),
            Value::List(items) => items
                .iter()
                .map(|item| self.write_value(item, None, depth + 1))
                .collect::<Result<Vec<_>>>()
                .map(JsonValue::Array),
            Value::Object(object) => self.write_object(object, target, depth),
            Value::Map(fields) => match target {
                Some(ty) => {
                    let schema = self.registry.get(ty)?;
                    let object = Object::with_fields(TypeRef::clone(ty), fields.clone());
                    self.write_fields(&object, &schema, depth)
                }
                None => self.write_plain(fields, depth),
            },
            Value::Opaque(_) => Err(TransformError::type_mismatch(
                "a JSON value",
                value.type_name(),
            )),
        }
    }

    /// A convertible value always writes itself. Otherwise `target`, when
    /// given, must have a schema and replaces the object's own type.
    fn write_object(&self, object: &Object, target: Option<&TypeRef>, depth: usize) -> Result<JsonValue> {
        if let Some(convertible) = find_convertible(object.ty()) {
            trace!(type_name = object.type_name(), "Delegating to convertible type");
            return convertible
                .to_tree(object)
                .map_err(TransformError::conversion);
        }

        let schema = match target {
            Some(target) => Some(self.registry.get(target)?),
            None => self.registry.find(object.ty()),
        };
        match schema {
            Some(schema) => self.write_fields(object, &schema, depth),
            None => {
                trace!(type_name = object.type_name(), "No schema, copying fields");
                self.write_plain(object.fields(), depth)
            }
        }
    }

    fn write_fields(&self, object: &Object, schema: &Schema, depth: usize) -> Result<JsonValue> {
        let mut tree = Map::new();
        for (key, rule) in schema.resolve_view(&self.options.view) {
            if let Some(wire) = self
                .write_field(object, key, rule, depth)
                .map_err(|e| TransformError::field(schema.owner_name(), key, e))?
            {
                tree.insert(rule.wire_name.clone(), wire);
            }
        }
        Ok(JsonValue::Object(tree))
    }

    fn write_plain(&self, fields: &FieldValues, depth: usize) -> Result<JsonValue> {
        fields
            .iter()
            .map(|(key, value)| -> Result<(String, JsonValue)> {
                Ok((key.clone(), self.write_value(value, None, depth + 1)?))
            })
            .collect::<Result<Map<_, _>>>()
            .map(JsonValue::Object)
    }

    /// Wire value of one field, or `None` when the field is left out
    fn write_field(
        &self,
        object: &Object,
        key: &str,
        rule: &FieldRule,
        depth: usize,
    ) -> Result<Option<JsonValue>> {
        let value = object.get(key);
        if rule.is_suppressed(value) {
            trace!(field = key, "Field suppressed");
            return Ok(None);
        }
        let Some(value) = value else {
            return Err(TransformError::RequiredFieldMissing {
                name: key.to_string(),
            });
        };
        trace!(field = key, wire_name = %rule.wire_name, "Writing field");

        let write_one = |item: &Value| -> Result<JsonValue> {
            match (&rule.kind, &rule.converter) {
                (ValueKind::Constructed(target), _) if matches!(item, Value::Map(_)) => {
                    self.write_value(item, Some(target), depth + 1)
                }
                (_, Some(converter)) => converter
                    .to_wire(item, object)
                    .map_err(TransformError::conversion),
                _ => self.write_value(item, None, depth + 1),
            }
        };

        let wire = match value {
            Value::List(items) if rule.repeated => JsonValue::Array(
                items.iter().map(write_one).collect::<Result<Vec<_>>>()?,
            ),
            other => write_one(other)?,
        };

        check_field(rule, &wire)?;
        Ok(Some(wire))
    }
}

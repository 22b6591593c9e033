//! Parser: JSON tree to object graph
//!
//! Builds an instance of a model type from a wire tree. Each field is looked
//! up by its wire name, checked, converted and assigned; constructed fields
//! recurse with the same options. Errors raised for one field are wrapped
//! with the owning schema and the field key, once per level.

use std::collections::BTreeSet;

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace};

use crate::classify::find_convertible;
use crate::config::TransformConfig;
use crate::error::{Result, TransformError};
use crate::registry::SchemaRegistry;
use crate::schema::{FieldRule, ResolvedView, ValueKind, DEFAULT_VIEW};
use crate::transform::{check_depth, check_field, check_tree_depth, elements, DEFAULT_MAX_DEPTH};
use crate::types::TypeRef;
use crate::value::{json_type_name, Object, Value};

/// Options for a parse call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// View whose rules apply; unknown views fall back to the default view
    pub view: String,
    /// Reject the first wire key no field declares
    pub strict_unknown_keys: bool,
    /// Reject unknown wire keys, reporting all of them in one error
    pub strict_aggregate_keys: bool,
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            view: DEFAULT_VIEW.to_string(),
            strict_unknown_keys: false,
            strict_aggregate_keys: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn from_config(config: &TransformConfig) -> Self {
        Self {
            view: config.parse.default_view.clone(),
            strict_unknown_keys: config.parse.strict_unknown_keys,
            strict_aggregate_keys: config.parse.strict_aggregate_keys,
            max_depth: config.limits.max_depth,
        }
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    pub fn with_strict_unknown_keys(mut self, strict: bool) -> Self {
        self.strict_unknown_keys = strict;
        self
    }

    pub fn with_strict_aggregate_keys(mut self, strict: bool) -> Self {
        self.strict_aggregate_keys = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn is_strict(&self) -> bool {
        self.strict_unknown_keys || self.strict_aggregate_keys
    }
}

/// Parses JSON into instances using the schemas of one registry
#[derive(Debug, Clone)]
pub struct JsonParser<'r> {
    registry: &'r SchemaRegistry,
    options: ParseOptions,
}

impl<'r> JsonParser<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_options(registry, ParseOptions::default())
    }

    pub fn with_options(registry: &'r SchemaRegistry, options: ParseOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse JSON text into an instance of `ty`
    pub fn parse(&self, text: &str, ty: &TypeRef) -> Result<Object> {
        let tree: JsonValue = serde_json::from_str(text)?;
        self.from_tree(&tree, ty)
    }

    /// Build an instance of `ty` from a JSON tree
    pub fn from_tree(&self, tree: &JsonValue, ty: &TypeRef) -> Result<Object> {
        debug!(
            type_name = ty.name(),
            view = %self.options.view,
            strict = self.options.is_strict(),
            "Parsing"
        );
        self.parse_instance(tree, ty, 0)
    }

    fn parse_instance(&self, tree: &JsonValue, ty: &TypeRef, depth: usize) -> Result<Object> {
        check_depth(depth, self.options.max_depth)?;

        let mut instance = ty.instantiate();
        if let Some(convertible) = find_convertible(ty) {
            trace!(type_name = ty.name(), "Delegating to convertible type");
            convertible
                .from_tree(&mut instance, tree)
                .map_err(TransformError::conversion)?;
            return Ok(instance);
        }

        let schema = self.registry.get(ty)?;
        let wire = tree
            .as_object()
            .ok_or_else(|| TransformError::type_mismatch("Object", json_type_name(tree)))?;
        let fields = schema.resolve_view(&self.options.view);

        if self.options.is_strict() {
            self.check_unknown_keys(schema.owner_name(), &fields, wire)?;
        }

        for (key, rule) in fields {
            self.parse_field(&mut instance, key, rule, wire.get(&rule.wire_name), depth)
                .map_err(|e| TransformError::field(schema.owner_name(), key, e))?;
        }
        Ok(instance)
    }

    fn check_unknown_keys(
        &self,
        schema: &str,
        fields: &ResolvedView<'_>,
        wire: &Map<String, JsonValue>,
    ) -> Result<()> {
        let known: BTreeSet<&str> = fields.values().map(|rule| rule.wire_name.as_str()).collect();
        let mut unknown = wire.keys().filter(|key| !known.contains(key.as_str()));

        let keys: Vec<String> = if self.options.strict_aggregate_keys {
            unknown.cloned().collect()
        } else {
            unknown.next().cloned().into_iter().collect()
        };

        if keys.is_empty() {
            return Ok(());
        }
        Err(TransformError::UnknownKey {
            schema: schema.to_string(),
            keys,
        })
    }

    fn parse_field(
        &self,
        instance: &mut Object,
        key: &str,
        rule: &FieldRule,
        wire: Option<&JsonValue>,
        depth: usize,
    ) -> Result<()> {
        trace!(field = key, wire_name = %rule.wire_name, present = wire.is_some(), "Parsing field");

        let Some(wire) = wire else {
            if let Some(default) = &rule.default_value {
                if !instance.contains_key(key) {
                    instance.set(key, default.clone());
                }
                return Ok(());
            }
            if rule.optional {
                return Ok(());
            }
            return Err(TransformError::RequiredFieldMissing {
                name: rule.wire_name.clone(),
            });
        };

        check_field(rule, wire)?;

        let value = match &rule.kind {
            ValueKind::Constructed(_) if wire.is_null() && rule.optional && !rule.repeated => {
                Value::Null
            }
            ValueKind::Constructed(target) if rule.repeated => Value::List(
                elements(wire)
                    .iter()
                    .map(|item| self.parse_instance(item, target, depth + 1).map(Value::Object))
                    .collect::<Result<_>>()?,
            ),
            ValueKind::Constructed(target) => {
                Value::Object(self.parse_instance(wire, target, depth + 1)?)
            }
            _ => match &rule.converter {
                Some(converter) if rule.repeated => Value::List(
                    elements(wire)
                        .iter()
                        .map(|item| {
                            converter
                                .from_wire(item, instance)
                                .map_err(TransformError::conversion)
                        })
                        .collect::<Result<_>>()?,
                ),
                Some(converter) => converter
                    .from_wire(wire, instance)
                    .map_err(TransformError::conversion)?,
                None => {
                    check_tree_depth(wire, depth, self.options.max_depth)?;
                    Value::from_json(wire)
                }
            },
        };

        instance.set(key, value);
        Ok(())
    }
}

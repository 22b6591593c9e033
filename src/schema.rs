//! Schemas, field rules and views
//!
//! A [`Schema`] is the complete rule set for one [`ModelType`](crate::ModelType).
//! Rules are partitioned by view name; every schema has the implicit
//! [`DEFAULT_VIEW`], and a named view only overrides or adds to it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::converter::Converter;
use crate::types::TypeRef;
use crate::validation::Validator;
use crate::value::Value;

/// Name of the view every rule without an explicit view belongs to
pub const DEFAULT_VIEW: &str = "default";

/// What a field holds
#[derive(Clone)]
pub enum ValueKind {
    /// Any JSON value, unchecked
    Any,
    Boolean,
    Number,
    String,
    /// An instance of another schema-bearing or convertible type
    Constructed(TypeRef),
}

impl ValueKind {
    pub fn name(&self) -> &str {
        match self {
            ValueKind::Any => "Any",
            ValueKind::Boolean => "Boolean",
            ValueKind::Number => "Number",
            ValueKind::String => "String",
            ValueKind::Constructed(ty) => ty.name(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, ValueKind::Constructed(_))
    }

    pub fn constructed_type(&self) -> Option<&TypeRef> {
        match self {
            ValueKind::Constructed(ty) => Some(ty),
            _ => None,
        }
    }

    /// Whether a wire value has this kind's shape. Constructed kinds are
    /// checked by the recursive transform, not here.
    pub fn accepts(&self, value: &JsonValue) -> bool {
        match self {
            ValueKind::Any | ValueKind::Constructed(_) => true,
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Number => value.is_number(),
            ValueKind::String => value.is_string(),
        }
    }
}

impl PartialEq for ValueKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueKind::Any, ValueKind::Any)
            | (ValueKind::Boolean, ValueKind::Boolean)
            | (ValueKind::Number, ValueKind::Number)
            | (ValueKind::String, ValueKind::String) => true,
            (ValueKind::Constructed(a), ValueKind::Constructed(b)) => a.key() == b.key(),
            _ => false,
        }
    }
}

impl fmt::Debug for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Constructed(ty) => write!(f, "Constructed({})", ty.name()),
            other => f.write_str(other.name()),
        }
    }
}

impl From<&TypeRef> for ValueKind {
    fn from(ty: &TypeRef) -> Self {
        ValueKind::Constructed(Arc::clone(ty))
    }
}

/// One declared field of a schema
#[derive(Clone)]
pub struct FieldRule {
    pub kind: ValueKind,
    pub repeated: bool,
    pub optional: bool,
    pub default_value: Option<Value>,
    pub converter: Option<Arc<dyn Converter>>,
    /// Key under which the field appears in the JSON tree
    pub wire_name: String,
    pub validators: Vec<Arc<dyn Validator>>,
    pub views: BTreeSet<String>,
}

impl FieldRule {
    /// Whether the field is left out of the wire tree given its in-memory value.
    ///
    /// `None` means the field is absent from the instance.
    pub fn is_suppressed(&self, value: Option<&Value>) -> bool {
        match value {
            None => self.optional || self.default_value.is_some(),
            Some(value) => self.default_value.as_ref() == Some(value),
        }
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("kind", &self.kind)
            .field("repeated", &self.repeated)
            .field("optional", &self.optional)
            .field("default_value", &self.default_value)
            .field("converter", &self.converter.is_some())
            .field("wire_name", &self.wire_name)
            .field("validators", &self.validators)
            .field("views", &self.views)
            .finish()
    }
}

/// Rules of one view, by field key
pub type FieldMap = BTreeMap<String, FieldRule>;

/// Effective rules for a view after overlaying it on the default view
pub type ResolvedView<'a> = BTreeMap<&'a str, &'a FieldRule>;

/// The rule set governing one type
#[derive(Debug, Clone)]
pub struct Schema {
    owner: TypeRef,
    views: BTreeMap<String, FieldMap>,
}

impl Schema {
    pub fn new(owner: TypeRef) -> Self {
        let mut views = BTreeMap::new();
        views.insert(DEFAULT_VIEW.to_string(), FieldMap::new());
        Self { owner, views }
    }

    /// Schema for `owner` seeded with a copy of `ancestor`'s rules
    pub fn inherit(owner: TypeRef, ancestor: &Schema) -> Self {
        Self {
            owner,
            views: ancestor.views.clone(),
        }
    }

    pub fn owner(&self) -> &TypeRef {
        &self.owner
    }

    pub fn owner_name(&self) -> &str {
        self.owner.name()
    }

    /// Rules declared for exactly `name`, without the default overlay
    pub fn view(&self, name: &str) -> Option<&FieldMap> {
        self.views.get(name)
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }

    /// Rules of the default view
    pub fn fields(&self) -> &FieldMap {
        &self.views[DEFAULT_VIEW]
    }

    /// Add `rule` under `key` to every view it is a member of, replacing any
    /// earlier rule for the same key in those views
    pub fn insert(&mut self, key: impl Into<String>, rule: FieldRule) {
        let key = key.into();
        for view in &rule.views {
            self.views
                .entry(view.clone())
                .or_default()
                .insert(key.clone(), rule.clone());
        }
    }

    /// Effective field map for `view`: the default rules with the named
    /// view's rules laid over them. An unknown view yields the default rules.
    pub fn resolve_view(&self, view: &str) -> ResolvedView<'_> {
        let mut resolved: ResolvedView<'_> = self
            .fields()
            .iter()
            .map(|(key, rule)| (key.as_str(), rule))
            .collect();

        if view == DEFAULT_VIEW {
            return resolved;
        }
        match self.views.get(view) {
            Some(overlay) => {
                resolved.extend(overlay.iter().map(|(key, rule)| (key.as_str(), rule)));
            }
            None => {
                debug!(
                    schema = self.owner_name(),
                    view, "Unknown view, falling back to default"
                );
            }
        }
        resolved
    }
}

//! Field declaration options
//!
//! [`FieldOptions`] is the builder handed to
//! [`SchemaRegistry::declare_field`](crate::SchemaRegistry::declare_field).
//! Constraint setters that describe the same check are merged: `length`,
//! `min_length` and `max_length` become one [`LengthValidator`], the two
//! exclusive bounds one [`ExclusiveRangeValidator`], and so on.

use std::collections::BTreeSet;
use std::sync::Arc;

use regex::Regex;

use crate::converter::Converter;
use crate::error::{Result, TransformError};
use crate::schema::{FieldRule, ValueKind, DEFAULT_VIEW};
use crate::types::TypeRef;
use crate::validation::{
    EnumerationValidator, ExclusiveRangeValidator, InclusiveRangeValidator, LengthValidator,
    PatternValidator, Validator,
};
use crate::value::Value;

#[derive(Clone)]
enum Constraint {
    Pattern(String),
    Length(LengthValidator),
    Enumeration(Vec<String>),
    Exclusive(ExclusiveRangeValidator),
    Inclusive(InclusiveRangeValidator),
    Custom(Arc<dyn Validator>),
}

/// Declarative options for one field
#[derive(Clone)]
pub struct FieldOptions {
    kind: ValueKind,
    repeated: bool,
    optional: bool,
    default_value: Option<Value>,
    converter: Option<Arc<dyn Converter>>,
    name: Option<String>,
    views: Vec<String>,
    constraints: Vec<Constraint>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self::new(ValueKind::Any)
    }
}

impl FieldOptions {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            repeated: false,
            optional: false,
            default_value: None,
            converter: None,
            name: None,
            views: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::new(ValueKind::String)
    }

    pub fn number() -> Self {
        Self::new(ValueKind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(ValueKind::Boolean)
    }

    pub fn any() -> Self {
        Self::new(ValueKind::Any)
    }

    /// Field holding an instance of `ty`
    pub fn constructed(ty: &TypeRef) -> Self {
        Self::new(ValueKind::from(ty))
    }

    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Wire name, when it differs from the field key
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declare the field for `view`. Without any view the field belongs to
    /// the default view only.
    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.views.push(view.into());
        self
    }

    pub fn views<I, S>(mut self, views: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.views.extend(views.into_iter().map(Into::into));
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.push(Constraint::Pattern(pattern.into()));
        self
    }

    /// Exact length; overrides `min_length` and `max_length`
    pub fn length(self, length: usize) -> Self {
        self.merge_length(|v| v.exact = Some(length))
    }

    pub fn min_length(self, min: usize) -> Self {
        self.merge_length(|v| v.min = Some(min))
    }

    pub fn max_length(self, max: usize) -> Self {
        self.merge_length(|v| v.max = Some(max))
    }

    pub fn enumeration<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.push(Constraint::Enumeration(
            allowed.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn min_exclusive(self, min: f64) -> Self {
        self.merge_exclusive(|v| v.min = Some(min))
    }

    pub fn max_exclusive(self, max: f64) -> Self {
        self.merge_exclusive(|v| v.max = Some(max))
    }

    pub fn min_inclusive(self, min: f64) -> Self {
        self.merge_inclusive(|v| v.min = Some(min))
    }

    pub fn max_inclusive(self, max: f64) -> Self {
        self.merge_inclusive(|v| v.max = Some(max))
    }

    /// Attach a custom validator, run after the ones declared before it
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.constraints.push(Constraint::Custom(Arc::new(validator)));
        self
    }

    pub fn value_kind(&self) -> &ValueKind {
        &self.kind
    }

    fn merge_length(mut self, update: impl FnOnce(&mut LengthValidator)) -> Self {
        let existing = self.constraints.iter_mut().find_map(|c| match c {
            Constraint::Length(v) => Some(v),
            _ => None,
        });
        match existing {
            Some(validator) => update(validator),
            None => {
                let mut validator = LengthValidator::default();
                update(&mut validator);
                self.constraints.push(Constraint::Length(validator));
            }
        }
        self
    }

    fn merge_exclusive(mut self, update: impl FnOnce(&mut ExclusiveRangeValidator)) -> Self {
        let existing = self.constraints.iter_mut().find_map(|c| match c {
            Constraint::Exclusive(v) => Some(v),
            _ => None,
        });
        match existing {
            Some(validator) => update(validator),
            None => {
                let mut validator = ExclusiveRangeValidator::default();
                update(&mut validator);
                self.constraints.push(Constraint::Exclusive(validator));
            }
        }
        self
    }

    fn merge_inclusive(mut self, update: impl FnOnce(&mut InclusiveRangeValidator)) -> Self {
        let existing = self.constraints.iter_mut().find_map(|c| match c {
            Constraint::Inclusive(v) => Some(v),
            _ => None,
        });
        match existing {
            Some(validator) => update(validator),
            None => {
                let mut validator = InclusiveRangeValidator::default();
                update(&mut validator);
                self.constraints.push(Constraint::Inclusive(validator));
            }
        }
        self
    }

    /// Build the rule for field `key` of `owner`, compiling its validators
    pub(crate) fn into_rule(self, owner: &str, key: &str) -> Result<FieldRule> {
        let invalid = |reason: String| TransformError::InvalidDeclaration {
            schema: owner.to_string(),
            field: key.to_string(),
            reason,
        };

        if self.converter.is_some() && !self.kind.is_primitive() {
            return Err(invalid(format!(
                "converter cannot be combined with constructed type '{}'",
                self.kind.name()
            )));
        }

        let mut validators: Vec<Arc<dyn Validator>> = Vec::with_capacity(self.constraints.len());
        for constraint in self.constraints {
            let validator: Arc<dyn Validator> = match constraint {
                Constraint::Pattern(pattern) => {
                    let regex = Regex::new(&pattern)
                        .map_err(|e| invalid(format!("invalid pattern '{}': {}", pattern, e)))?;
                    Arc::new(PatternValidator::from_regex(regex))
                }
                Constraint::Length(v) => Arc::new(v),
                Constraint::Enumeration(allowed) => Arc::new(EnumerationValidator::new(allowed)),
                Constraint::Exclusive(v) => Arc::new(v),
                Constraint::Inclusive(v) => Arc::new(v),
                Constraint::Custom(v) => v,
            };
            validators.push(validator);
        }

        let mut views: BTreeSet<String> = self.views.into_iter().collect();
        if views.is_empty() {
            views.insert(DEFAULT_VIEW.to_string());
        }

        Ok(FieldRule {
            kind: self.kind,
            repeated: self.repeated,
            optional: self.optional,
            default_value: self.default_value,
            converter: self.converter,
            wire_name: self.name.unwrap_or_else(|| key.to_string()),
            validators,
            views,
        })
    }
}

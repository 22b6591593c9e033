//! Model types
//!
//! A [`ModelType`] stands in for a class: it has an identity, a name, an
//! optional direct ancestor and the field values a fresh instance starts
//! with. Inheritance is the explicit `parent` link, walked by the registry
//! and the classifier; nothing is discovered at runtime.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::BoxError;
use crate::value::{FieldValues, Object, Value};

/// Shared handle to a model type
pub type TypeRef = Arc<ModelType>;

static NEXT_TYPE_KEY: AtomicU64 = AtomicU64::new(1);

/// Identity of a model type, unique for the life of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(u64);

impl TypeKey {
    fn next() -> Self {
        Self(NEXT_TYPE_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

/// A type that converts itself to and from a JSON tree, bypassing schema rules
pub trait Convertible: Send + Sync {
    fn to_tree(&self, object: &Object) -> Result<JsonValue, BoxError>;

    /// Fill `object`, a fresh instance, from `tree`
    fn from_tree(&self, object: &mut Object, tree: &JsonValue) -> Result<(), BoxError>;
}

/// Descriptor of an in-memory type
pub struct ModelType {
    key: TypeKey,
    name: String,
    parent: Option<TypeRef>,
    initial: FieldValues,
    convertible: Option<Arc<dyn Convertible>>,
}

impl ModelType {
    pub fn builder(name: impl Into<String>) -> ModelTypeBuilder {
        ModelTypeBuilder {
            name: name.into(),
            parent: None,
            initial: FieldValues::new(),
            convertible: None,
        }
    }

    /// A root type with no initial field values
    pub fn new(name: impl Into<String>) -> TypeRef {
        Self::builder(name).build()
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&TypeRef> {
        self.parent.as_ref()
    }

    /// Ancestors, nearest first. Does not include `self`.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: self.parent.as_deref(),
        }
    }

    /// `self` followed by its ancestors
    pub fn chain(&self) -> impl Iterator<Item = &ModelType> {
        std::iter::once(self).chain(self.ancestors())
    }

    /// Whether `self` is `other` or derives from it
    pub fn is_a(&self, other: &ModelType) -> bool {
        self.chain().any(|ty| ty.key == other.key)
    }

    /// Convertible hook declared on this exact type
    pub fn own_convertible(&self) -> Option<&Arc<dyn Convertible>> {
        self.convertible.as_ref()
    }

    /// Zero-argument instance: ancestors' initial values first, then our own
    pub fn instantiate(self: &Arc<Self>) -> Object {
        let mut lineage: Vec<&ModelType> = self.chain().collect();
        lineage.reverse();

        let mut fields = FieldValues::new();
        for ty in lineage {
            fields.extend(ty.initial.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Object::with_fields(Arc::clone(self), fields)
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("convertible", &self.convertible.is_some())
            .finish()
    }
}

/// Iterator over a type's ancestors
pub struct Ancestors<'a> {
    next: Option<&'a ModelType>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ModelType;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}

/// Builder for [`ModelType`]
pub struct ModelTypeBuilder {
    name: String,
    parent: Option<TypeRef>,
    initial: FieldValues,
    convertible: Option<Arc<dyn Convertible>>,
}

impl ModelTypeBuilder {
    /// Derive from `parent`
    pub fn extends(mut self, parent: &TypeRef) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Initial value of a field on fresh instances
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.initial.insert(key.into(), value.into());
        self
    }

    pub fn convertible(mut self, convertible: impl Convertible + 'static) -> Self {
        self.convertible = Some(Arc::new(convertible));
        self
    }

    pub fn build(self) -> TypeRef {
        Arc::new(ModelType {
            key: TypeKey::next(),
            name: self.name,
            parent: self.parent,
            initial: self.initial,
            convertible: self.convertible,
        })
    }
}

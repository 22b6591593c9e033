//! Schema Registry
//!
//! Maps each model type to its [`Schema`]. Entries are created the first time
//! a field is declared for a type and are never removed.
//!
//! ## Inheritance
//! A type's schema is created as a copy of its nearest registered ancestor's
//! schema and then extended. A type with no schema of its own resolves to the
//! ancestor's schema itself, so related types can share one rule set.
//!
//! ## Concurrency
//! Declarations take a single write lock; lookups take the read lock and hand
//! out `Arc<Schema>` snapshots, so a transform never holds the lock while it
//! recurses.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::classify::is_convertible;
use crate::error::{Result, TransformError};
use crate::field::FieldOptions;
use crate::schema::Schema;
use crate::types::{ModelType, TypeKey, TypeRef};

static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();

/// Process-wide or local collection of schemas
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<TypeKey, Arc<Schema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry used by the crate-level free functions
    pub fn global() -> &'static SchemaRegistry {
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeKey, Arc<Schema>>> {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TypeKey, Arc<Schema>>> {
        self.schemas.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `ty` or any of its ancestors has a schema
    pub fn has(&self, ty: &ModelType) -> bool {
        let schemas = self.read();
        ty.chain().any(|t| schemas.contains_key(&t.key()))
    }

    /// Schema of `ty`, else of its nearest ancestor that has one
    pub fn find(&self, ty: &ModelType) -> Option<Arc<Schema>> {
        let schemas = self.read();
        ty.chain().find_map(|t| schemas.get(&t.key()).cloned())
    }

    pub fn get(&self, ty: &ModelType) -> Result<Arc<Schema>> {
        self.find(ty).ok_or_else(|| TransformError::SchemaNotFound {
            type_name: ty.name().to_string(),
        })
    }

    /// Schema registered for exactly `ty`, ignoring ancestors
    pub fn get_own(&self, ty: &ModelType) -> Option<Arc<Schema>> {
        self.read().get(&ty.key()).cloned()
    }

    /// Apply `extend` to the schema registered for exactly `ty`, first
    /// registering one seeded from the nearest ancestor's rules if needed
    pub fn create_or_extend<R>(&self, ty: &TypeRef, extend: impl FnOnce(&mut Schema) -> R) -> R {
        let mut schemas = self.write();

        if !schemas.contains_key(&ty.key()) {
            let seeded = match ty.ancestors().find_map(|a| schemas.get(&a.key())) {
                Some(ancestor) => {
                    debug!(
                        schema = ty.name(),
                        ancestor = ancestor.owner_name(),
                        "Creating schema from ancestor"
                    );
                    Schema::inherit(Arc::clone(ty), ancestor)
                }
                None => {
                    debug!(schema = ty.name(), "Creating schema");
                    Schema::new(Arc::clone(ty))
                }
            };
            schemas.insert(ty.key(), Arc::new(seeded));
        }

        let entry = schemas
            .entry(ty.key())
            .or_insert_with(|| Arc::new(Schema::new(Arc::clone(ty))));
        extend(Arc::make_mut(entry))
    }

    /// Declare field `key` of `owner`; the last declaration for a
    /// `(key, view)` pair wins
    pub fn declare_field(
        &self,
        owner: &TypeRef,
        key: impl Into<String>,
        options: FieldOptions,
    ) -> Result<()> {
        let key = key.into();

        if let Some(target) = options.value_kind().constructed_type() {
            let self_reference = target.key() == owner.key();
            if !self_reference && !is_convertible(target) && !self.has(target) {
                return Err(TransformError::InvalidDeclaration {
                    schema: owner.name().to_string(),
                    field: key,
                    reason: format!(
                        "type '{}' has no schema and is not convertible",
                        target.name()
                    ),
                });
            }
        }

        let rule = options.into_rule(owner.name(), &key)?;
        debug!(
            schema = owner.name(),
            field = %key,
            wire_name = %rule.wire_name,
            kind = rule.kind.name(),
            "Declaring field"
        );
        self.create_or_extend(owner, |schema| schema.insert(key, rule));
        Ok(())
    }

    /// Number of types with a schema of their own
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

//! Type classification
//!
//! Decides how the engine treats a value or a type. Convertibility is
//! inherited along the ancestor chain and wins over a registered schema.

use std::sync::Arc;

use crate::registry::SchemaRegistry;
use crate::types::{Convertible, ModelType};
use crate::value::Value;

/// How a value or type is transformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Scalar, passed through unchanged
    Primitive,
    Array,
    /// Converts itself; schema rules are bypassed
    Convertible,
    /// Has a reachable schema
    SchemaObject,
    /// Object without a schema; own keys are transformed generically
    PlainObject,
}

/// The nearest convertible hook on `ty` or its ancestors
pub fn find_convertible(ty: &ModelType) -> Option<&Arc<dyn Convertible>> {
    ty.chain().find_map(ModelType::own_convertible)
}

pub fn is_convertible(ty: &ModelType) -> bool {
    find_convertible(ty).is_some()
}

pub fn classify_type(registry: &SchemaRegistry, ty: &ModelType) -> Classification {
    if is_convertible(ty) {
        Classification::Convertible
    } else if registry.has(ty) {
        Classification::SchemaObject
    } else {
        Classification::PlainObject
    }
}

pub fn classify(registry: &SchemaRegistry, value: &Value) -> Classification {
    match value {
        Value::List(_) => Classification::Array,
        Value::Object(object) => classify_type(registry, object.ty()),
        Value::Map(_) => Classification::PlainObject,
        Value::Null
        | Value::Bool(_)
        | Value::Number(_)
        | Value::String(_)
        | Value::Opaque(_) => Classification::Primitive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::field::FieldOptions;
    use crate::value::{FieldValues, Object};
    use serde_json::{json, Value as JsonValue};

    struct Echo;

    impl Convertible for Echo {
        fn to_tree(&self, _object: &Object) -> Result<JsonValue, BoxError> {
            Ok(json!("echo"))
        }

        fn from_tree(&self, _object: &mut Object, _tree: &JsonValue) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[test]
    fn test_primitives_and_collections() {
        let registry = SchemaRegistry::new();
        assert_eq!(classify(&registry, &Value::from(1)), Classification::Primitive);
        assert_eq!(classify(&registry, &Value::Null), Classification::Primitive);
        assert_eq!(classify(&registry, &Value::from(vec![1, 2])), Classification::Array);
        assert_eq!(
            classify(&registry, &Value::Map(FieldValues::new())),
            Classification::PlainObject
        );
    }

    #[test]
    fn test_convertible_is_inherited() {
        let base = ModelType::builder("Base").convertible(Echo).build();
        let derived = ModelType::builder("Derived").extends(&base).build();
        assert!(is_convertible(&derived));
        assert!(!is_convertible(&ModelType::new("Plain")));
    }

    #[test]
    fn test_convertible_wins_over_schema() {
        let registry = SchemaRegistry::new();
        let ty = ModelType::builder("Both").convertible(Echo).build();
        registry
            .declare_field(&ty, "value", FieldOptions::number())
            .unwrap();
        assert_eq!(classify_type(&registry, &ty), Classification::Convertible);
    }

    #[test]
    fn test_schema_object_through_ancestor() {
        let registry = SchemaRegistry::new();
        let parent = ModelType::new("Parent");
        let child = ModelType::builder("Child").extends(&parent).build();
        registry
            .declare_field(&parent, "id", FieldOptions::string())
            .unwrap();

        let object = Value::Object(child.instantiate());
        assert_eq!(classify(&registry, &object), Classification::SchemaObject);
        assert_eq!(
            classify_type(&registry, &ModelType::new("Loose")),
            Classification::PlainObject
        );
    }
}

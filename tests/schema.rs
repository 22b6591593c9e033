//! Schema registry behavior: inheritance and declaration rules

use std::sync::Arc;

use familiar_transform::{
    classify_type, Classification, ErrorKind, FieldOptions, IntegerStringConverter, ModelType,
    SchemaRegistry, DEFAULT_VIEW,
};

#[test]
fn test_extending() {
    let registry = SchemaRegistry::new();
    let parent = ModelType::new("Parent");
    let child = ModelType::builder("Child").extends(&parent).build();
    registry.declare_field(&parent, "value", FieldOptions::any()).unwrap();
    registry.declare_field(&child, "name", FieldOptions::any()).unwrap();

    assert_eq!(registry.get(&parent).unwrap().fields().len(), 1);
    assert_eq!(registry.get(&child).unwrap().fields().len(), 2);
}

#[test]
fn test_child_without_declarations_shares_schema() {
    let registry = SchemaRegistry::new();
    let parent = ModelType::new("Parent");
    let child = ModelType::builder("Child").extends(&parent).build();
    registry.declare_field(&parent, "value", FieldOptions::any()).unwrap();

    let parent_schema = registry.get(&parent).unwrap();
    let child_schema = registry.get(&child).unwrap();
    assert_eq!(child_schema.fields().len(), 1);
    assert!(Arc::ptr_eq(&parent_schema, &child_schema));
    assert!(registry.has(&child));
}

#[test]
fn test_later_parent_fields_not_seen_by_existing_child() {
    let registry = SchemaRegistry::new();
    let parent = ModelType::new("Parent");
    let child = ModelType::builder("Child").extends(&parent).build();
    registry.declare_field(&parent, "value", FieldOptions::any()).unwrap();
    registry.declare_field(&child, "name", FieldOptions::any()).unwrap();
    registry.declare_field(&parent, "late", FieldOptions::any()).unwrap();

    assert_eq!(registry.get(&parent).unwrap().fields().len(), 2);
    assert!(!registry.get(&child).unwrap().fields().contains_key("late"));
}

#[test]
fn test_views_inherited() {
    let registry = SchemaRegistry::new();
    let parent = ModelType::new("Parent");
    let child = ModelType::builder("Child").extends(&parent).build();
    registry
        .declare_field(&parent, "value", FieldOptions::any().name("v").view("short"))
        .unwrap();
    registry.declare_field(&child, "name", FieldOptions::any()).unwrap();

    let schema = registry.get(&child).unwrap();
    assert!(schema.has_view("short"));
    let short = schema.resolve_view("short");
    assert_eq!(short.len(), 2);
    assert_eq!(short["value"].wire_name, "v");
    assert_eq!(schema.resolve_view(DEFAULT_VIEW).len(), 1);
}

#[test]
fn test_missing_schema() {
    let registry = SchemaRegistry::new();
    let err = registry.get(&ModelType::new("Parent")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaNotFound);
}

#[test]
fn test_constructed_type_must_be_known() {
    let registry = SchemaRegistry::new();
    let child = ModelType::new("Child");
    let parent = ModelType::new("Parent");

    let err = registry
        .declare_field(&parent, "child", FieldOptions::constructed(&child))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDeclaration);

    registry.declare_field(&child, "value", FieldOptions::any()).unwrap();
    registry
        .declare_field(&parent, "child", FieldOptions::constructed(&child))
        .unwrap();
    assert_eq!(classify_type(&registry, &parent), Classification::SchemaObject);
}

#[test]
fn test_converter_on_constructed_rejected() {
    let registry = SchemaRegistry::new();
    let child = ModelType::new("Child");
    registry.declare_field(&child, "value", FieldOptions::any()).unwrap();

    let err = registry
        .declare_field(
            &ModelType::new("Parent"),
            "child",
            FieldOptions::constructed(&child).converter(Arc::new(IntegerStringConverter)),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDeclaration);
}

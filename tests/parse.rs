//! Parsing JSON into object graphs

use std::sync::Arc;

use familiar_transform::{
    from_tree, parse, BoxError, Convertible, ErrorKind, FieldOptions, IntegerStringConverter,
    JsonParser, ModelType, Object, ParseOptions, SchemaRegistry, Value,
};
use serde_json::{json, Value as JsonValue};

fn value_type(registry: &SchemaRegistry, options: FieldOptions) -> familiar_transform::TypeRef {
    let ty = ModelType::builder("Test").field("value", 0).build();
    registry.declare_field(&ty, "value", options).unwrap();
    ty
}

#[test]
fn test_unknown_keys_ignored_by_default() {
    let registry = SchemaRegistry::new();
    let ty = value_type(&registry, FieldOptions::number());

    let object = JsonParser::new(&registry)
        .parse(r#"{"value":2,"odd":1}"#, &ty)
        .unwrap();
    assert_eq!(object.get("value"), Some(&Value::from(2)));
    assert!(!object.contains_key("odd"));
}

#[test]
fn test_unknown_key_rejected_in_strict_mode() {
    let registry = SchemaRegistry::new();
    let ty = value_type(&registry, FieldOptions::number());

    let parser = JsonParser::with_options(
        &registry,
        ParseOptions::default().with_strict_unknown_keys(true),
    );
    let err = parser.parse(r#"{"value":2,"odd":1}"#, &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownKey);
    assert_eq!(err.unknown_keys(), Some(&["odd".to_string()][..]));
    assert!(err.to_string().contains("odd"));
}

#[test]
fn test_required_field_missing() {
    let registry = SchemaRegistry::new();
    let ty = value_type(&registry, FieldOptions::any().name("v"));

    let err = JsonParser::new(&registry).parse("{}", &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequiredFieldMissing);
    assert!(err.to_string().contains("'v'"));
}

#[test]
fn test_optional_field_keeps_initial_value() {
    let registry = SchemaRegistry::new();
    let ty = value_type(&registry, FieldOptions::number().optional());

    let object = JsonParser::new(&registry).parse("{}", &ty).unwrap();
    assert_eq!(object.get("value"), Some(&Value::from(0)));
}

#[test]
fn test_default_value_restored_when_absent() {
    let registry = SchemaRegistry::new();
    let ty = ModelType::new("Defaults");
    registry
        .declare_field(&ty, "level", FieldOptions::number().default_value(3))
        .unwrap();

    let object = JsonParser::new(&registry).parse("{}", &ty).unwrap();
    assert_eq!(object.get("level"), Some(&Value::from(3)));
}

#[test]
fn test_converter() {
    let registry = SchemaRegistry::new();
    let ty = value_type(
        &registry,
        FieldOptions::any().converter(Arc::new(IntegerStringConverter)),
    );

    let object = JsonParser::new(&registry).parse(r#"{"value":"2"}"#, &ty).unwrap();
    assert_eq!(object.get("value"), Some(&Value::from(2)));
}

#[test]
fn test_converter_failure_is_conversion_error() {
    let registry = SchemaRegistry::new();
    let ty = value_type(
        &registry,
        FieldOptions::any().converter(Arc::new(IntegerStringConverter)),
    );

    let err = JsonParser::new(&registry)
        .parse(r#"{"value":"two"}"#, &ty)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    assert_eq!(err.path_string(), "Test.value");
}

#[test]
fn test_custom_name() {
    let registry = SchemaRegistry::new();
    let ty = value_type(&registry, FieldOptions::any().name("v"));

    let object = JsonParser::new(&registry).parse(r#"{"v":2}"#, &ty).unwrap();
    assert_eq!(object.get("value"), Some(&Value::from(2)));
}

#[test]
fn test_repeated() {
    let registry = SchemaRegistry::new();
    let ty = value_type(&registry, FieldOptions::any().name("v").repeated());

    let object = JsonParser::new(&registry).parse(r#"{"v":[1,2,3]}"#, &ty).unwrap();
    assert_eq!(object.get("value"), Some(&Value::from(vec![1, 2, 3])));
}

#[test]
fn test_repeated_converter() {
    let registry = SchemaRegistry::new();
    let ty = value_type(
        &registry,
        FieldOptions::any()
            .name("v")
            .repeated()
            .converter(Arc::new(IntegerStringConverter)),
    );

    let object = JsonParser::new(&registry)
        .parse(r#"{"v":["1","2","3"]}"#, &ty)
        .unwrap();
    assert_eq!(object.get("value"), Some(&Value::from(vec![1, 2, 3])));
}

#[test]
fn test_repeated_requires_array() {
    let registry = SchemaRegistry::new();
    let ty = value_type(&registry, FieldOptions::string().repeated());

    let err = JsonParser::new(&registry)
        .from_tree(&json!({"value": "not Array"}), &ty)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_check_types() {
    let registry = SchemaRegistry::new();
    let parser = JsonParser::new(&registry);

    let boolean = value_type(&registry, FieldOptions::boolean().name("v"));
    assert!(parser.parse(r#"{"v":true}"#, &boolean).is_ok());
    assert_eq!(
        parser.parse(r#"{"v":1}"#, &boolean).unwrap_err().kind(),
        ErrorKind::TypeMismatch
    );

    let number = value_type(&registry, FieldOptions::number().name("v"));
    assert!(parser.parse(r#"{"v":1}"#, &number).is_ok());
    assert!(parser.parse(r#"{"v":"1"}"#, &number).is_err());

    let string = value_type(&registry, FieldOptions::string().name("v"));
    assert!(parser.parse(r#"{"v":"text"}"#, &string).is_ok());
    assert!(parser.parse(r#"{"v":1}"#, &string).is_err());
}

#[test]
fn test_pattern() {
    let registry = SchemaRegistry::new();
    let ty = ModelType::new("Pattern");
    registry
        .declare_field(&ty, "text", FieldOptions::any().pattern("[0-9]{6}"))
        .unwrap();
    let parser = JsonParser::new(&registry);

    let object = parser.parse(r#"{"text":"123456"}"#, &ty).unwrap();
    assert_eq!(object.get("text"), Some(&Value::from("123456")));
    // parsing twice gives the same answer
    assert!(parser.parse(r#"{"text":"123456"}"#, &ty).is_ok());

    let err = parser.parse(r#"{"text":"a23456"}"#, &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = parser.parse(r#"{"text":123456}"#, &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_constructed() {
    let registry = SchemaRegistry::new();
    let child = ModelType::new("Child");
    let parent = ModelType::new("Parent");
    registry.declare_field(&child, "value", FieldOptions::number()).unwrap();
    registry
        .declare_field(&parent, "child", FieldOptions::constructed(&child))
        .unwrap();

    let object = JsonParser::new(&registry)
        .parse(r#"{"child":{"value":2}}"#, &parent)
        .unwrap();
    let nested = object.get("child").and_then(Value::as_object).unwrap();
    assert_eq!(nested.type_name(), "Child");
    assert_eq!(nested.get("value"), Some(&Value::from(2)));
}

#[test]
fn test_constructed_repeated() {
    let registry = SchemaRegistry::new();
    let child = ModelType::new("Child");
    let parent = ModelType::new("Parent");
    registry
        .declare_field(&child, "value", FieldOptions::number().name("v"))
        .unwrap();
    registry
        .declare_field(&parent, "children", FieldOptions::constructed(&child).repeated())
        .unwrap();

    let object = JsonParser::new(&registry)
        .parse(r#"{"children":[{"v":1},{"v":2}]}"#, &parent)
        .unwrap();
    let children = object.get("children").and_then(Value::as_list).unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(
        children[1].as_object().and_then(|c| c.get("value")),
        Some(&Value::from(2))
    );
}

#[test]
fn test_nested_error_carries_full_path() {
    let registry = SchemaRegistry::new();
    let child = ModelType::new("Child");
    let parent = ModelType::new("Parent");
    registry
        .declare_field(&child, "value", FieldOptions::number().max_inclusive(10.0))
        .unwrap();
    registry
        .declare_field(&parent, "children", FieldOptions::constructed(&child).repeated())
        .unwrap();

    let err = JsonParser::new(&registry)
        .from_tree(&json!({"children": [{"value": 1}, {"value": 11}]}), &parent)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.path_string(), "Parent.children > Child.value");
}

struct NameOnly;

impl Convertible for NameOnly {
    fn to_tree(&self, object: &Object) -> Result<JsonValue, BoxError> {
        Ok(json!(object.get("name").and_then(Value::as_str).unwrap_or_default()))
    }

    fn from_tree(&self, object: &mut Object, tree: &JsonValue) -> Result<(), BoxError> {
        let name = tree.as_str().ok_or("expected a string")?;
        object.set("name", name);
        Ok(())
    }
}

#[test]
fn test_convertible_without_schema() {
    let registry = SchemaRegistry::new();
    let ty = ModelType::builder("Named")
        .field("name", "")
        .convertible(NameOnly)
        .build();

    let object = JsonParser::new(&registry).parse(r#""test""#, &ty).unwrap();
    assert_eq!(object.get("name"), Some(&Value::from("test")));

    let err = JsonParser::new(&registry).parse("1", &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
}

#[test]
fn test_missing_schema() {
    let registry = SchemaRegistry::new();
    let err = JsonParser::new(&registry)
        .parse("{}", &ModelType::new("Unknown"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaNotFound);
}

#[test]
fn test_global_registry_functions() {
    let ty = ModelType::new("GlobalParse");
    familiar_transform::declare_field(&ty, "value", FieldOptions::number()).unwrap();

    let object = parse(r#"{"value":5}"#, &ty, ParseOptions::default()).unwrap();
    assert_eq!(object.get("value"), Some(&Value::from(5)));

    let object = from_tree(&json!({"value": 6}), &ty, ParseOptions::default()).unwrap();
    assert_eq!(object.get("value"), Some(&Value::from(6)));
}

fn short_viewed(registry: &SchemaRegistry) -> familiar_transform::TypeRef {
    let child = ModelType::new("Child");
    registry
        .declare_field(&child, "value", FieldOptions::number())
        .unwrap();
    registry
        .declare_field(&child, "value", FieldOptions::number().name("v").view("short"))
        .unwrap();

    let parent = ModelType::new("Parent");
    registry.declare_field(&parent, "id", FieldOptions::string()).unwrap();
    registry
        .declare_field(&parent, "child", FieldOptions::constructed(&child))
        .unwrap();
    parent
}

#[test]
fn test_views() {
    let registry = SchemaRegistry::new();
    let parent = short_viewed(&registry);

    let short = JsonParser::with_options(&registry, ParseOptions::default().with_view("short"));
    let object = short
        .parse(r#"{"id":"1","child":{"v":3}}"#, &parent)
        .unwrap();
    let child = object.get("child").and_then(Value::as_object).unwrap();
    assert_eq!(child.get("value"), Some(&Value::from(3)));

    // the default wire name is not read under the named view
    let err = short
        .parse(r#"{"id":"1","child":{"value":3}}"#, &parent)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequiredFieldMissing);
    assert_eq!(err.path_string(), "Parent.child > Child.value");
}

#[test]
fn test_strict_mode_checks_view_wire_names() {
    let registry = SchemaRegistry::new();
    let parent = short_viewed(&registry);

    let parser = JsonParser::with_options(
        &registry,
        ParseOptions::default()
            .with_view("short")
            .with_strict_unknown_keys(true),
    );
    assert!(parser.parse(r#"{"id":"1","child":{"v":3}}"#, &parent).is_ok());

    let err = parser
        .parse(r#"{"id":"1","child":{"v":3,"value":3}}"#, &parent)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownKey);
    assert_eq!(err.unknown_keys(), Some(&["value".to_string()][..]));
}

#[test]
fn test_unknown_view_parses_as_default() {
    let registry = SchemaRegistry::new();
    let parent = short_viewed(&registry);
    let text = r#"{"id":"1","child":{"value":3}}"#;

    let wrong = JsonParser::with_options(&registry, ParseOptions::default().with_view("wrong"))
        .parse(text, &parent)
        .unwrap();
    let default = JsonParser::new(&registry).parse(text, &parent).unwrap();
    assert_eq!(wrong, default);
}

#[test]
fn test_concurrent_parse_and_serialize() {
    let ty = ModelType::builder("Shared").field("value", 0).build();
    familiar_transform::declare_field(&ty, "value", FieldOptions::number().min_inclusive(0.0))
        .unwrap();

    std::thread::scope(|scope| {
        for n in 0..8 {
            let ty = &ty;
            scope.spawn(move || {
                let text = format!(r#"{{"value":{}}}"#, n);
                let object = parse(&text, ty, ParseOptions::default()).unwrap();
                let back = familiar_transform::serialize(
                    &object,
                    familiar_transform::SerializeOptions::default(),
                )
                .unwrap();
                assert_eq!(back, text);
            });
        }
    });
}

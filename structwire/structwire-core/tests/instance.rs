use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
};

use structwire_core::{CodecError, DataTypeDef, FieldError, StructInstance, StructSchema, Value};

fn service_exception() -> Arc<StructSchema> {
    StructSchema::builder("ServiceException")
        .required(1, "message", DataTypeDef::String)
        .optional(2, "stacktrace", DataTypeDef::String)
        .optional(
            3,
            "inputs",
            DataTypeDef::map(DataTypeDef::String, DataTypeDef::String),
        )
        .build()
        .expect("valid schema")
}

fn hash_of(v: &impl Hash) -> u64 {
    let mut h = DefaultHasher::new();
    v.hash(&mut h);
    h.finish()
}

#[test]
fn string_form_omits_unset_optional_fields() {
    let mut x = StructInstance::new(service_exception());
    x.set(1, "boom").expect("set message");
    x.put_to_map(3, "b", "2").expect("put");
    x.put_to_map(3, "a", "1").expect("put");

    assert_eq!(x.to_string(), "ServiceException(message:boom, inputs:{a=1, b=2})");
}

#[test]
fn string_form_renders_unset_required_field_as_null() {
    let mut x = StructInstance::new(service_exception());
    x.set(2, "trace").expect("set stacktrace");
    assert_eq!(x.to_string(), "ServiceException(message:null, stacktrace:trace)");
}

#[test]
fn setting_none_unsets_the_field() {
    let mut x = StructInstance::new(service_exception());
    x.set(2, "trace").expect("set");
    assert!(x.is_set(2));
    x.set_opt(2, None).expect("unset");
    assert!(!x.is_set(2));
    assert_eq!(x.get(2), None);
}

#[test]
fn fields_are_reachable_by_name() {
    let mut x = StructInstance::new(service_exception());
    x.set_by_name("message", "boom").expect("set by name");

    assert_eq!(x.get_by_name("message"), Some(&Value::from("boom")));
    assert_eq!(x.get_by_name("message"), x.get(1));
    assert_eq!(x.get_by_name("stacktrace"), None);
    assert_eq!(x.get_by_name("missing"), None);
}

#[test]
fn setter_rejects_wrong_type_and_unknown_field() {
    let mut x = StructInstance::new(service_exception());
    let err = x.set(1, 5i32).expect_err("type mismatch");
    assert!(matches!(err, FieldError::TypeMismatch { ref field, .. } if field == "message"));

    let err = x.set(9, "x").expect_err("unknown id");
    assert_eq!(
        err,
        FieldError::UnknownId {
            struct_name: "ServiceException".to_string(),
            id: 9
        }
    );

    let err = x.set_by_name("nope", "x").expect_err("unknown name");
    assert!(matches!(err, FieldError::UnknownName { .. }));

    let err = x.add_to_list(3, "x").expect_err("not a list");
    assert!(matches!(err, FieldError::TypeMismatch { .. }));
}

#[test]
fn clone_is_independent_of_source() {
    let mut source = StructInstance::new(service_exception());
    source.set(1, "boom").expect("set");
    source.put_to_map(3, "a", "1").expect("put");

    let mut copy = source.clone();
    copy.put_to_map(3, "z", "26").expect("put");

    assert_eq!(source.container_len(3), 1);
    assert_eq!(copy.container_len(3), 2);
    assert_ne!(source, copy);
}

#[test]
fn validate_reports_missing_required_field() {
    let x = StructInstance::new(service_exception());
    let err = x.validate().expect_err("message missing");
    assert_eq!(
        err,
        CodecError::Validation {
            struct_name: "ServiceException".to_string(),
            field: "message".to_string(),
            rendered: "ServiceException(message:null)".to_string(),
        }
    );
    assert_eq!(
        err.to_string(),
        "Required field 'message' was not present! Struct: ServiceException(message:null)"
    );
}

#[test]
fn unset_sorts_before_set() {
    let schema = service_exception();
    let a = StructInstance::new(schema.clone()).with(1, "m").expect("set");
    let b = a.clone().with(2, "").expect("set");
    assert!(a < b);
}

#[test]
fn different_shapes_compare_by_name() {
    let other = StructSchema::builder("AnotherShape")
        .optional(1, "message", DataTypeDef::String)
        .build()
        .expect("valid schema");
    let a = StructInstance::new(other).with(1, "m").expect("set");
    let b = StructInstance::new(service_exception())
        .with(1, "m")
        .expect("set");
    assert!(a < b);
    assert_ne!(a, b);
}

#[test]
fn equal_instances_hash_equal() {
    let schema = service_exception();
    let mut a = StructInstance::new(schema.clone());
    a.set(1, "boom").expect("set");
    a.put_to_map(3, "a", "1").expect("put");

    let mut b = StructInstance::new(schema);
    b.set(3, Value::map_of([("a", "1")])).expect("set");
    b.set(1, "boom").expect("set");

    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn unset_returns_previous_value_and_clear_resets_all() {
    let mut x = StructInstance::new(service_exception());
    x.set(1, "boom").expect("set");
    x.set(2, "trace").expect("set");
    assert_eq!(x.unset(2).expect("known id"), Some(Value::string("trace")));
    x.clear();
    assert!(x.fields().all(|(_, slot)| slot.is_none()));
}

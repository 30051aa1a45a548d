//! Serialization Invariant Tests
//!
//! - Output keys are exactly the declared attributes, in declaration order
//! - Resolution is deterministic
//! - Coercion runs before validation
//! - Derived types append their attributes after the parent's
//! - Mismatch handlers are looked up through the parent chain at call time
//! - Nested construction failures are handled as mismatches

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wireform::descriptor::{
    any, array, epoch_to_rfc3339, integer, nested, number, object, optional, string, timestamp,
};
use wireform::{RecordType, Single, SerializerConfig};

// =============================================================================
// Helper Functions
// =============================================================================

fn order_type() -> Arc<RecordType> {
    RecordType::builder("OrderType")
        .attribute("price_cents", integer())
        .attribute("payment_method", string())
        .build()
        .unwrap()
}

fn account_type() -> Arc<RecordType> {
    RecordType::builder("AccountType")
        .attribute("id", integer())
        .attribute("name", string())
        .attribute("order", nested(&order_type()))
        .build()
        .unwrap()
}

fn account() -> Value {
    json!({
        "order": {"payment_method": "card_123456", "price_cents": 12345},
        "name": "Jamie",
        "id": 123,
        "internal_notes": "never serialized"
    })
}

// =============================================================================
// Shape Tests
// =============================================================================

/// Keys follow declaration order, not source order, and undeclared
/// source fields are dropped.
#[test]
fn test_output_keys_follow_declaration() {
    let record = account_type().serialize(&account()).unwrap();

    assert_eq!(record.keys().collect::<Vec<_>>(), vec!["id", "name", "order"]);
    let order = record["order"].as_object().unwrap();
    assert_eq!(
        order.keys().collect::<Vec<_>>(),
        vec!["price_cents", "payment_method"]
    );
}

/// Same object, same output, every time.
#[test]
fn test_resolution_is_deterministic() {
    let account_type = account_type();
    let source = account();
    let first = Single::new(&account_type, &source).unwrap().to_json().unwrap();

    for _ in 0..100 {
        assert_eq!(
            Single::new(&account_type, &source).unwrap().to_json().unwrap(),
            first
        );
    }
}

/// Absent fields read as null.
#[test]
fn test_absent_field_reads_as_null() {
    let profile = RecordType::builder("ProfileType")
        .attribute("bio", optional([string()]))
        .build()
        .unwrap();

    let record = profile.serialize(&json!({})).unwrap();

    assert_eq!(record["bio"], Value::Null);
}

// =============================================================================
// Coercion Tests
// =============================================================================

/// The coerced value is what gets validated and emitted.
#[test]
fn test_coercion_precedes_validation() {
    let event = RecordType::builder("EventType")
        .attribute("at", timestamp().coerce_with(epoch_to_rfc3339))
        .attribute(
            "tags",
            array([string().coerce_with(|tag| match tag {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other,
            })]),
        )
        .build()
        .unwrap();

    let record = event
        .serialize(&json!({"at": 946684799, "tags": ["a", "b"]}))
        .unwrap();

    assert_eq!(record["at"], json!("1999-12-31T23:59:59+00:00"));
    assert_eq!(record["tags"], json!(["A", "B"]));
}

/// Object coercion recurses into declared fields only.
#[test]
fn test_object_coercion_recurses() {
    let settings = RecordType::builder("SettingsType")
        .attribute(
            "options",
            object([("count", integer().coerce_with(|v| {
                v.as_f64().map(|f| json!(f.round() as i64)).unwrap_or(v)
            }))]),
        )
        .build()
        .unwrap();

    let record = settings
        .serialize(&json!({"options": {"count": 2.6, "extra": true}}))
        .unwrap();

    assert_eq!(record["options"], json!({"count": 3, "extra": true}));
}

/// A value matching no member of an any() passes through coercion
/// untouched and then fails validation.
#[test]
fn test_any_without_match_is_validated_raw() {
    let reading = RecordType::builder("ReadingType")
        .attribute("value", any([number(), string()]))
        .build()
        .unwrap();

    assert!(reading.serialize(&json!({"value": 4})).is_ok());
    assert!(reading.serialize(&json!({"value": "4"})).is_ok());

    let err = reading.serialize(&json!({"value": [4]})).unwrap_err();
    assert_eq!(
        err.to_string(),
        "ReadingType#value is specified as any(number, string), but is [4]"
    );
}

// =============================================================================
// Inheritance Tests
// =============================================================================

/// Derived attributes are appended after the parent's.
#[test]
fn test_derived_type_appends_attributes() {
    let base = RecordType::builder("BaseType")
        .attribute("id", integer())
        .attribute("name", string())
        .build()
        .unwrap();
    let audited = RecordType::builder("AuditedType")
        .extends(&base)
        .attribute("metadata", object(Vec::<(String, _)>::new()))
        .build()
        .unwrap();

    assert_eq!(audited.attribute_names(), vec!["id", "name", "metadata"]);
    assert_eq!(base.attribute_names(), vec!["id", "name"]);
    assert_eq!(
        audited.to_string(),
        "AuditedType(id: integer, name: string, metadata: object())"
    );

    let record = audited
        .serialize(&json!({"metadata": {"source": "import"}, "name": "Jamie", "id": 1}))
        .unwrap();
    assert_eq!(record.keys().collect::<Vec<_>>(), vec!["id", "name", "metadata"]);
    assert_eq!(record["metadata"], json!({"source": "import"}));
}

/// Redeclaring a parent attribute overrides its descriptor in place.
#[test]
fn test_override_keeps_parent_position() {
    let base = RecordType::builder("BaseType")
        .attribute("id", integer())
        .attribute("name", string())
        .build()
        .unwrap();
    let loose = RecordType::builder("LooseType")
        .extends(&base)
        .attribute("id", any([integer(), string()]))
        .build()
        .unwrap();

    assert_eq!(loose.attribute_names(), vec!["id", "name"]);
    assert!(loose.serialize(&json!({"id": "abc", "name": "x"})).is_ok());
    assert!(base.serialize(&json!({"id": "abc", "name": "x"})).is_err());
}

/// A handler installed on the parent after the child was defined still
/// applies to the child.
#[test]
fn test_parent_handler_resolved_at_call_time() {
    let base = RecordType::builder("BaseType")
        .attribute("id", integer())
        .build()
        .unwrap();
    let child = RecordType::builder("ChildType")
        .extends(&base)
        .attribute("name", string())
        .build()
        .unwrap();
    let source = json!({"id": "not a number", "name": "ok"});

    assert!(child.serialize(&source).is_err());

    base.set_mismatch_handler(|_| Ok(json!(0)));
    let record = child.serialize(&source).unwrap();
    assert_eq!(record["id"], json!(0));

    child.set_mismatch_handler(|_| Ok(json!(-1)));
    assert_eq!(child.serialize(&source).unwrap()["id"], json!(-1));
    assert_eq!(base.serialize(&source).unwrap()["id"], json!(0));

    child.clear_mismatch_handler();
    base.clear_mismatch_handler();
    assert!(child.serialize(&source).is_err());
}

// =============================================================================
// Nested Record Tests
// =============================================================================

/// A nested field mismatch aborts with the nested type's name.
#[test]
fn test_nested_mismatch_names_inner_type() {
    let source = json!({
        "id": 1,
        "name": "Jamie",
        "order": {"price_cents": 100, "payment_method": 42}
    });

    let err = account_type().serialize(&source).unwrap_err();

    assert_eq!(err.code(), "WIREFORM_TYPE_MISMATCH");
    assert!(err.to_string().starts_with("OrderType#payment_method"));
}

/// A nil nested object goes to the owning attribute's handler.
#[test]
fn test_nil_nested_object_is_handled_as_mismatch() {
    let account_type = account_type();
    account_type.set_mismatch_handler(|mismatch| {
        assert_eq!(mismatch.attribute, "order");
        assert!(mismatch.value.is_null());
        Ok(json!({}))
    });

    let record = account_type
        .serialize(&json!({"id": 1, "name": "Jamie", "order": null}))
        .unwrap();

    assert_eq!(record["order"], json!({}));
}

// =============================================================================
// Configuration Tests
// =============================================================================

/// Encoding options come from a configuration file.
#[test]
fn test_configured_encoding() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("wireform.json");
    std::fs::write(&path, r#"{"csv_delimiter": "|", "json_pretty": true}"#).unwrap();
    let config = SerializerConfig::load(&path).unwrap();

    let user = RecordType::builder("UserType")
        .attribute("id", integer())
        .attribute("name", string())
        .build()
        .unwrap();
    let source = json!({"id": 7, "name": "a|b"});
    let single = Single::new(&user, &source).unwrap();

    assert_eq!(single.to_csv_with(&config).unwrap(), "id|name\n7|\"a|b\"\n");
    assert_eq!(
        single.to_json_with(&config).unwrap(),
        "{\n  \"id\": 7,\n  \"name\": \"a|b\"\n}"
    );
}

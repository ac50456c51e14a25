//! Tests for the value model.

use super::*;
use serde_json::json;

#[test]
fn test_truthiness() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(!Value::Int(0).is_truthy());
    assert!(!Value::Float(0.0).is_truthy());
    assert!(!Value::empty().is_truthy());
    assert!(!Value::List(vec![]).is_truthy());
    assert!(!Value::Map(Map::new()).is_truthy());

    assert!(Value::Bool(true).is_truthy());
    assert!(Value::Int(-1).is_truthy());
    assert!(Value::from("0").is_truthy());
    assert!(Value::List(vec![Value::Null]).is_truthy());
    assert!(Value::object(Record::new("User")).is_truthy());
}

#[test]
fn test_display() {
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::Int(42).to_string(), "42");
    assert_eq!(Value::Float(19.5).to_string(), "19.5");
    assert_eq!(Value::from("hi").to_string(), "hi");
    assert_eq!(Value::from(json!([1, "a"])).to_string(), r#"[1,"a"]"#);
    assert_eq!(Value::from(json!({"b": 2, "a": 1})).to_string(), r#"{"a":1,"b":2}"#);
}

#[test]
fn test_from_json_numbers() {
    assert_eq!(Value::from(json!(3)), Value::Int(3));
    assert_eq!(Value::from(json!(2.5)), Value::Float(2.5));
    assert_eq!(Value::Int(2), Value::Float(2.0));
}

#[test]
fn test_get_indexes_maps_objects_and_lists() {
    let map = Value::from(json!({"user": {"name": "Alice"}, "items": ["x", "y"]}));
    let user = map.get("user").unwrap();
    assert_eq!(user.get("name"), Some(Value::from("Alice")));
    assert_eq!(map.get("items").unwrap().get("1"), Some(Value::from("y")));
    assert_eq!(map.get("items").unwrap().get("9"), None);
    assert_eq!(map.get("missing"), None);

    let record = Value::object(Record::new("User").with_field("email", "a@example.com"));
    assert_eq!(record.get("email"), Some(Value::from("a@example.com")));
    assert_eq!(record.get("name"), None);

    assert_eq!(Value::from("text").get("len"), None);
}

#[test]
fn test_numeric_views() {
    assert_eq!(Value::from(" 18 ").as_f64(), Some(18.0));
    assert_eq!(Value::from("abc").as_f64(), None);
    assert_eq!(Value::Bool(true).as_f64(), None);
    assert_eq!(Value::Float(3.0).as_i64(), Some(3));
    assert_eq!(Value::Float(3.5).as_i64(), None);
}

#[test]
fn test_object_serializes_as_fields() {
    let record = Value::object(Record::new("User").with_field("name", "Bob").with_field("age", 30));
    assert_eq!(record.to_json(), json!({"name": "Bob", "age": 30}));
    assert_eq!(record.type_name(), "User");
}

#[test]
fn test_deserialize_from_yaml() {
    let value: Value = serde_yaml::from_str("name: Alice\ntags: [a, b]\nactive: true\n").unwrap();
    assert_eq!(value.get("name"), Some(Value::from("Alice")));
    assert_eq!(value.get("active"), Some(Value::Bool(true)));
    assert_eq!(
        value.get("tags"),
        Some(Value::List(vec![Value::from("a"), Value::from("b")]))
    );
}

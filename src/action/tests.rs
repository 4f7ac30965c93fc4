use serde_json::json;

use super::*;

#[test]
fn deserialize_plain() {
    let a: AnyAction = serde_json::from_value(json!({ "type": "INC" })).unwrap();
    assert_eq!(a, AnyAction::new("INC"));
    assert_eq!(a.action_type(), "INC");
    assert_eq!(a.payload_as::<i64>(), None);
}

#[test]
fn deserialize_with_payload() {
    let a: AnyAction = serde_json::from_value(json!({ "type": "INC", "payload": 3 })).unwrap();
    assert_eq!(a.payload_as::<i64>(), Some(3));
    assert_eq!(a.payload_as::<String>(), None);
}

#[test]
fn serialize_skips_empty_fields() {
    let v = serde_json::to_value(AnyAction::new("DEC")).unwrap();
    assert_eq!(v, json!({ "type": "DEC" }));
}

#[test]
fn failure_sets_error_flag() {
    let a = AnyAction::failure("FETCH_USER_REJECTED", "offline");
    let v = serde_json::to_value(&a).unwrap();
    assert_eq!(
        v,
        json!({ "type": "FETCH_USER_REJECTED", "payload": "offline", "error": true })
    );
}

#[test]
fn display_is_type() {
    assert_eq!(AnyAction::new("SET_USER_NAME").to_string(), "SET_USER_NAME");
}

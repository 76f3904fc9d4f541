use super::*;

fn person() -> Value {
    Value::record(
        Record::named("Person")
            .with("name", "Ada")
            .with("age", 36)
            .with("address", Record::new().with("city", "Bern")),
    )
}

#[test]
fn compare_widens_numbers() {
    assert_eq!(
        Value::Int(3).compare(&Value::Float(3.5)).unwrap(),
        Ordering::Less
    );
    assert_eq!(
        Value::Float(5.0).compare(&Value::Int(5)).unwrap(),
        Ordering::Equal
    );
    assert_eq!(
        Value::from("b").compare(&Value::from("a")).unwrap(),
        Ordering::Greater
    );
}

#[test]
fn compare_rejects_mixed_kinds() {
    let err = Value::Int(1).compare(&Value::from("1")).unwrap_err();
    assert!(matches!(err, ExprKitError::Evaluation(_)));
    assert!(Value::Null.compare(&Value::Null).is_err());
    assert!(Value::Int(1).partial_compare(&Value::Bool(true)).is_err());
}

#[test]
fn nan_is_unordered_but_not_a_kind_error() {
    let nan = Value::Float(f64::NAN);
    assert_eq!(nan.partial_compare(&Value::Float(1.0)).unwrap(), None);
    assert_eq!(Value::Int(1).partial_compare(&nan).unwrap(), None);
    assert!(nan.compare(&Value::Float(1.0)).is_err());
    assert!(!nan.loose_eq(&nan));
}

#[test]
fn int_float_comparison_is_exact_past_f64_precision() {
    let big = Value::Int(9_007_199_254_740_993);
    let near = Value::Float(9_007_199_254_740_992.0);
    assert!(!big.loose_eq(&near));
    assert_eq!(big.compare(&near).unwrap(), Ordering::Greater);
    assert_eq!(near.compare(&big).unwrap(), Ordering::Less);
    assert!(Value::Int(9_007_199_254_740_992).loose_eq(&near));

    assert_eq!(
        Value::Int(i64::MAX).compare(&Value::Float(9.3e18)).unwrap(),
        Ordering::Less
    );
    assert_eq!(
        Value::Int(i64::MIN).compare(&Value::Float(f64::NEG_INFINITY)).unwrap(),
        Ordering::Greater
    );
    assert_eq!(
        Value::Int(-2).compare(&Value::Float(-2.5)).unwrap(),
        Ordering::Greater
    );
}

#[test]
fn loose_eq_widens_but_keeps_kinds_apart() {
    assert!(Value::Int(2).loose_eq(&Value::Float(2.0)));
    assert!(!Value::Int(1).loose_eq(&Value::Bool(true)));
    assert!(Value::Null.loose_eq(&Value::Null));
}

#[test]
fn member_reads_fields_and_propagates_null() {
    let p = person();
    assert_eq!(p.member("age").unwrap(), Value::Int(36));
    assert_eq!(Value::Null.member("age").unwrap(), Value::Null);

    let err = p.member("salary").unwrap_err();
    assert!(err.to_string().contains("Person has no member `salary`"));
    assert!(Value::Int(1).member("x").is_err());
}

#[test]
fn convert_follows_numeric_rules() {
    assert_eq!(
        Value::Int(2).convert(&ValueType::Float).unwrap(),
        Value::Float(2.0)
    );
    assert_eq!(
        Value::Float(-2.7).convert(&ValueType::Int).unwrap(),
        Value::Int(-2)
    );
    assert!(Value::Float(f64::INFINITY).convert(&ValueType::Int).is_err());
    assert_eq!(
        Value::Int(7).convert(&ValueType::Str).unwrap(),
        Value::from("7")
    );
    assert_eq!(Value::Null.convert(&ValueType::Int).unwrap(), Value::Null);
    assert!(Value::from("x").convert(&ValueType::Int).is_err());
}

#[test]
fn convert_checks_record_names() {
    let p = person();
    assert!(p.convert(&ValueType::record("Person")).is_ok());
    assert!(p.convert(&ValueType::Record(None)).is_ok());
    assert!(p.convert(&ValueType::record("Order")).is_err());
}

#[test]
fn json_round_trips_through_records() {
    let json = serde_json::json!({"name": "Ada", "age": 36, "score": 1.5, "tags": null});
    let v = Value::try_from(json.clone()).unwrap();
    assert_eq!(v.member("age").unwrap(), Value::Int(36));
    assert_eq!(v.member("score").unwrap(), Value::Float(1.5));
    assert_eq!(serde_json::to_value(&v).unwrap(), json);
}

#[test]
fn json_arrays_are_rejected() {
    let err = Value::try_from(serde_json::json!([1, 2])).unwrap_err();
    assert!(matches!(err, ExprKitError::InvalidShape(_)));
}

#[test]
fn display_quotes_strings_and_keeps_float_marker() {
    assert_eq!(Value::from("a\"b").to_string(), "\"a\\\"b\"");
    assert_eq!(Value::Float(1.0).to_string(), "1.0");
    assert_eq!(ValueType::record("Person").to_string(), "Person");
    assert_eq!(ValueType::Int.to_string(), "int");
}

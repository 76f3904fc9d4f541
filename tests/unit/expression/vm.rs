use super::*;
use crate::expression::lower::lower_lambda;
use crate::expression::parser::parse_lambda;
use crate::foundation::value::Record;

fn eval(src: &str, args: &[Value]) -> ExprKitResult<Value> {
    let p = lower_lambda(&parse_lambda(src).unwrap()).unwrap();
    eval_program(&p, args, 64)
}

fn eval0(src: &str) -> ExprKitResult<Value> {
    eval(src, &[Value::Null])
}

#[test]
fn integer_arithmetic_stays_integral() {
    assert_eq!(eval0("x => 1 + 2 * 3").unwrap(), Value::Int(7));
    assert_eq!(eval0("x => 7 / 2").unwrap(), Value::Int(3));
    assert_eq!(eval0("x => 7 % 4").unwrap(), Value::Int(3));
    assert_eq!(eval0("x => -(2 - 5)").unwrap(), Value::Int(3));
}

#[test]
fn mixed_arithmetic_widens_to_float() {
    assert_eq!(eval0("x => 1 + 0.5").unwrap(), Value::Float(1.5));
    assert_eq!(eval0("x => 3 / 2.0").unwrap(), Value::Float(1.5));
}

#[test]
fn string_concatenation() {
    assert_eq!(
        eval0("x => \"ab\" + \"cd\"").unwrap(),
        Value::from("abcd")
    );
}

#[test]
fn overflow_and_division_by_zero_are_evaluation_errors() {
    let err = eval0("x => 9223372036854775807 + 1").unwrap_err();
    assert!(matches!(err, ExprKitError::Evaluation(_)));
    let err = eval0("x => 1 / 0").unwrap_err();
    assert!(matches!(err, ExprKitError::Evaluation(_)));
}

#[test]
fn comparisons_and_equality() {
    assert_eq!(eval0("x => 3 < 5").unwrap(), Value::Bool(true));
    assert_eq!(eval0("x => 5 <= 5").unwrap(), Value::Bool(true));
    assert_eq!(eval0("x => 1 == 1.0").unwrap(), Value::Bool(true));
    assert_eq!(eval0("x => \"a\" != \"b\"").unwrap(), Value::Bool(true));
    assert_eq!(eval0("x => null == null").unwrap(), Value::Bool(true));
    let err = eval0("x => 1 < \"a\"").unwrap_err();
    assert!(matches!(err, ExprKitError::Evaluation(_)));
}

#[test]
fn logical_operands_must_be_bool() {
    assert!(matches!(
        eval0("x => 1 && true").unwrap_err(),
        ExprKitError::Evaluation(_)
    ));
    assert!(matches!(
        eval0("x => true && 1").unwrap_err(),
        ExprKitError::Evaluation(_)
    ));
    assert_eq!(eval0("x => false || true").unwrap(), Value::Bool(true));
}

#[test]
fn member_access_on_null_propagates_null() {
    assert_eq!(eval("x => x.a.b", &[Value::Null]).unwrap(), Value::Null);
    let rec = Value::record(Record::new().with("a", Value::Null));
    assert_eq!(eval("x => x.a.b", &[rec]).unwrap(), Value::Null);
}

#[test]
fn missing_member_is_an_evaluation_error() {
    let rec = Value::record(Record::named("Person").with("age", 3));
    let err = eval("x => x.name", &[rec]).unwrap_err();
    assert!(err.to_string().contains("Person has no member `name`"));
}

#[test]
fn builtin_methods() {
    let rec = Value::record(Record::new().with("name", "  Ada Lovelace "));
    assert_eq!(eval("x => x.name.trim().len()", &[rec.clone()]).unwrap(), Value::Int(12));
    assert_eq!(
        eval("x => x.name.trim().lower()", &[rec.clone()]).unwrap(),
        Value::from("ada lovelace")
    );
    assert_eq!(
        eval("x => x.name.contains(\"Love\")", &[rec.clone()]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        eval("x => x.name.trim().ends_with(\"lace\")", &[rec]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(eval0("x => abs(-4)").unwrap(), Value::Int(4));
    assert_eq!(eval0("x => max(2, 7.5)").unwrap(), Value::Float(7.5));
    assert_eq!(eval0("x => min(2, 7)").unwrap(), Value::Int(2));
    assert_eq!(eval0("x => is_null(x)").unwrap(), Value::Bool(true));
}

#[test]
fn string_method_on_number_is_an_evaluation_error() {
    let err = eval0("x => upper(3)").unwrap_err();
    assert!(matches!(err, ExprKitError::Evaluation(_)));
}

#[test]
fn conversions() {
    assert_eq!(eval0("x => 3.9 as int").unwrap(), Value::Int(3));
    assert_eq!(eval0("x => 3 as str").unwrap(), Value::from("3"));
    assert_eq!(eval0("x => null as int").unwrap(), Value::Null);
    assert!(eval0("x => \"a\" as int").is_err());
}

#[test]
fn stack_depth_is_bounded() {
    let p = lower_lambda(&parse_lambda("x => 1 + (2 + (3 + 4))").unwrap()).unwrap();
    assert_eq!(eval_program(&p, &[Value::Null], 4).unwrap(), Value::Int(10));
    let err = eval_program(&p, &[Value::Null], 3).unwrap_err();
    assert!(err.to_string().contains("stack depth exceeds 3"));
}

#[test]
fn stack_is_reused_between_runs() {
    let p = lower_lambda(&parse_lambda("x => x + 1").unwrap()).unwrap();
    let mut stack = Vec::new();
    for i in 0..3 {
        let v = eval_program_with_stack(&p, &[Value::Int(i)], 8, &mut stack).unwrap();
        assert_eq!(v, Value::Int(i + 1));
    }
}

#[test]
fn malformed_program_leaves_extra_values() {
    let mut p = BytecodeProgram::new();
    let c = p.push_const(Value::Int(1));
    p.ops.push(Op::PushConst(c));
    p.ops.push(Op::PushConst(c));
    let err = eval_program(&p, &[], 8).unwrap_err();
    assert!(err.to_string().contains("2 values"));
}

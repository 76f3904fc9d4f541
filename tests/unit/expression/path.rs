use super::*;
use crate::expression::parser::parse_lambda;
use crate::foundation::value::ValueType;

#[test]
fn resolves_nested_member_chain() {
    let x = Expr::parameter("x", ValueType::Any);
    let l = Lambda::new([x.clone()], x.member("A").member("B")).unwrap();
    assert_eq!(path_of(&l).unwrap(), "A.B");
    assert_eq!(member_path(&l).unwrap(), vec!["A", "B"]);
}

#[test]
fn single_leading_conversion_is_tolerated() {
    let x = Expr::parameter("x", ValueType::Any);
    let l = Lambda::new(
        [x.clone()],
        x.member("A").member("B").convert(ValueType::Any),
    )
    .unwrap();
    assert_eq!(path_of(&l).unwrap(), "A.B");
}

#[test]
fn second_conversion_is_rejected() {
    let x = Expr::parameter("x", ValueType::Any);
    let body = x
        .member("A")
        .convert(ValueType::Any)
        .member("B")
        .convert(ValueType::Any);
    let l = Lambda::new([x.clone()], body).unwrap();
    let err = path_of(&l).unwrap_err();
    assert!(matches!(err, ExprKitError::InvalidShape(_)));
}

#[test]
fn full_path_prefixes_owner() {
    let l = parse_lambda("p => p.address.city").unwrap();
    assert_eq!(full_path_of(&l, "Person").unwrap(), "Person.address.city");
}

#[test]
fn method_call_body_is_invalid_shape() {
    let l = parse_lambda("x => x.name.len()").unwrap();
    let err = path_of(&l).unwrap_err();
    assert!(matches!(err, ExprKitError::InvalidShape(_)));
    assert!(err.to_string().contains("method call"));
}

#[test]
fn method_call_inside_chain_is_invalid_shape() {
    let l = parse_lambda("x => x.items.first().name").unwrap();
    assert!(matches!(
        path_of(&l).unwrap_err(),
        ExprKitError::InvalidShape(_)
    ));
}

#[test]
fn constant_and_bare_parameter_bodies_are_invalid_shape() {
    let l = parse_lambda("x => 42").unwrap();
    assert!(matches!(
        path_of(&l).unwrap_err(),
        ExprKitError::InvalidShape(_)
    ));

    let l = parse_lambda("x => x").unwrap();
    let err = path_of(&l).unwrap_err();
    assert!(err.to_string().contains("bare parameter"));
}

#[test]
fn chain_ending_at_foreign_parameter_is_invalid_shape() {
    let x = Expr::parameter("x", ValueType::Any);
    let other = Expr::parameter("y", ValueType::Any);
    let l = Lambda::new([x], other.member("A")).unwrap();
    let err = path_of(&l).unwrap_err();
    assert!(err.to_string().contains("foreign parameter `y`"));
}

#[test]
fn multi_parameter_lambda_is_invalid_shape() {
    let l = parse_lambda("(a, b) => a.x").unwrap();
    assert!(matches!(
        path_of(&l).unwrap_err(),
        ExprKitError::InvalidShape(_)
    ));
}

use crate::expression::ast::{Expr, UnaryOp};
use crate::expression::lambda::Lambda;
use crate::expression::parser::{parse_lambda, parse_predicate};
use crate::foundation::value::{Value, ValueType};

fn roundtrip(src: &str) -> String {
    let l = parse_lambda(src).unwrap();
    let shown = l.to_string();
    let again = parse_lambda(&shown).unwrap();
    assert_eq!(again, l, "`{shown}` did not reparse into the same tree");
    shown
}

#[test]
fn binary_nodes_are_fully_parenthesized() {
    assert_eq!(
        roundtrip("p => p.age >= 18 && p.name.starts_with(\"A\")"),
        "p => ((p.age >= 18) && p.name.starts_with(\"A\"))"
    );
    assert_eq!(roundtrip("x => 1 + 2 * 3"), "x => (1 + (2 * 3))");
}

#[test]
fn typed_and_multi_parameter_headers() {
    assert_eq!(roundtrip("(p: Person) => p.age"), "(p: Person) => p.age");
    assert_eq!(roundtrip("(a, b: int) => a < b"), "(a, b: int) => (a < b)");
    assert_eq!(roundtrip("() => null"), "() => null");
}

#[test]
fn conversions_and_conditionals() {
    assert_eq!(roundtrip("x => x.a as float"), "x => (x.a as float)");
    assert_eq!(
        roundtrip("x => x.ok ? \"y\" : \"n\""),
        "x => (x.ok ? \"y\" : \"n\")"
    );
    assert_eq!(
        roundtrip("x => (x.a as str).len()"),
        "x => (x.a as str).len()"
    );
}

#[test]
fn negatives_and_unary_operators() {
    assert_eq!(roundtrip("x => -5"), "x => (-5)");
    assert_eq!(roundtrip("x => -x.a"), "x => -x.a");
    assert_eq!(roundtrip("x => -(5)"), "x => -(5)");
    assert_eq!(roundtrip("x => (-x).abs()"), "x => (-x).abs()");
    assert_eq!(roundtrip("x => !!x.b"), "x => !!x.b");
    assert_eq!(roundtrip("x => (-2.5).abs()"), "x => (-2.5).abs()");
}

#[test]
fn strings_are_escaped() {
    assert_eq!(
        roundtrip(r#"x => x.s == "a\"b\\c\n""#),
        r#"x => (x.s == "a\"b\\c\n")"#
    );
}

#[test]
fn built_trees_render_the_same_way() {
    let p = Expr::parameter("n", ValueType::Int);
    let body = Expr::unary(UnaryOp::Not, Expr::constant(true));
    let l = Lambda::new([p], body).unwrap();
    assert_eq!(l.to_string(), "(n: int) => !(true)");

    let x = Expr::parameter("x", ValueType::Any);
    let l = Lambda::new([x.clone()], x.member("a").convert(ValueType::Any)).unwrap();
    assert_eq!(l.to_string(), "x => (x.a as any)");
    assert_eq!(Expr::constant(Value::Float(1.0)).to_string(), "1.0");
}

#[test]
fn composed_predicates_reparse() {
    let a = parse_predicate("p => p.age > 20").unwrap();
    let b = parse_predicate("q => q.age < 30").unwrap();
    let c = a.and(&b).unwrap();
    let shown = c.to_string();
    assert_eq!(shown, "p => ((p.age > 20) && (p.age < 30))");
    assert_eq!(parse_predicate(&shown).unwrap(), c);
}

use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn lexes_lambda_header_and_operators() {
    assert_eq!(
        kinds("(p: Person) => p.age >= 18 && !p.banned"),
        vec![
            TokenKind::LParen,
            TokenKind::Ident("p".to_owned()),
            TokenKind::Colon,
            TokenKind::Ident("Person".to_owned()),
            TokenKind::RParen,
            TokenKind::Arrow,
            TokenKind::Ident("p".to_owned()),
            TokenKind::Dot,
            TokenKind::Ident("age".to_owned()),
            TokenKind::Ge,
            TokenKind::Int(18),
            TokenKind::AndAnd,
            TokenKind::Bang,
            TokenKind::Ident("p".to_owned()),
            TokenKind::Dot,
            TokenKind::Ident("banned".to_owned()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn distinguishes_ints_and_floats() {
    assert_eq!(
        kinds("1 1.5 2e3 7"),
        vec![
            TokenKind::Int(1),
            TokenKind::Float(1.5),
            TokenKind::Float(2000.0),
            TokenKind::Int(7),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn int_followed_by_method_call_keeps_the_dot() {
    assert_eq!(
        kinds("5.abs()"),
        vec![
            TokenKind::Int(5),
            TokenKind::Dot,
            TokenKind::Ident("abs".to_owned()),
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords() {
    assert_eq!(
        kinds("true false null as"),
        vec![
            TokenKind::True,
            TokenKind::False,
            TokenKind::Null,
            TokenKind::As,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_escapes_are_decoded() {
    assert_eq!(
        kinds(r#""a\"b\\c\nd\te" "héllo""#),
        vec![
            TokenKind::Str("a\"b\\c\nd\te".to_owned()),
            TokenKind::Str("héllo".to_owned()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn spans_are_byte_offsets() {
    let toks = lex("x  => x").unwrap();
    assert_eq!(toks[1].span, Span { start: 3, end: 5 });
    assert_eq!(toks[3].span, Span { start: 7, end: 7 });
}

#[test]
fn errors_carry_offsets() {
    match lex("x => x # 1").unwrap_err() {
        ExprKitError::Parse { offset, message } => {
            assert_eq!(offset, 7);
            assert!(message.contains("unexpected character '#'"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(
        lex("\"open").unwrap_err(),
        ExprKitError::Parse { offset: 0, .. }
    ));
    assert!(matches!(
        lex("1e+").unwrap_err(),
        ExprKitError::Parse { offset: 1, .. }
    ));
    assert!(matches!(
        lex(r#""\q""#).unwrap_err(),
        ExprKitError::Parse { offset: 1, .. }
    ));
}

#[test]
fn overflowing_float_literals_are_rejected() {
    match lex("x => x.a < 1e400").unwrap_err() {
        ExprKitError::Parse { offset, message } => {
            assert_eq!(offset, 11);
            assert_eq!(message, "float literal out of range");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(kinds("1e-400")[0], TokenKind::Float(0.0));
    assert_eq!(kinds("1e308")[0], TokenKind::Float(1e308));
}

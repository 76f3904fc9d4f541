use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ExprKitError::null_argument("left")
            .to_string()
            .contains("null argument:")
    );
    assert!(
        ExprKitError::invalid_shape("x")
            .to_string()
            .contains("invalid shape:")
    );
    assert!(
        ExprKitError::not_supported("x")
            .to_string()
            .contains("not supported:")
    );
    assert!(
        ExprKitError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert_eq!(
        ExprKitError::parse(4, "unexpected token").to_string(),
        "parse error at byte 4: unexpected token"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ExprKitError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

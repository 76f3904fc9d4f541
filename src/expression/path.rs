//! Member-path extraction from selector lambdas.

use crate::expression::ast::{Expr, ExprKind};
use crate::expression::lambda::Lambda;
use crate::foundation::error::{ExprKitError, ExprKitResult};

/// Member names of a selector body, root-most first.
///
/// The body must be a chain of member accesses ending at the lambda's own parameter,
/// optionally wrapped in one conversion (`x => x.a.b`, `x => (x.a.b as any)`).
pub fn member_path(lambda: &Lambda) -> ExprKitResult<Vec<String>> {
    let param = lambda.single_param()?;
    let mut node = unwrap_conversion(lambda.body());
    let mut names = Vec::new();

    loop {
        match node.kind() {
            ExprKind::Member { parent, name } => {
                names.push(name.clone());
                if parent.ptr_eq(param) {
                    break;
                }
                node = parent;
            }
            ExprKind::Parameter { name, .. } if names.is_empty() && node.ptr_eq(param) => {
                return Err(ExprKitError::invalid_shape(format!(
                    "selector body is the bare parameter `{name}`; expected a member access"
                )));
            }
            ExprKind::Parameter { name, .. } => {
                return Err(ExprKitError::invalid_shape(format!(
                    "member chain ends at foreign parameter `{name}`"
                )));
            }
            other => {
                return Err(ExprKitError::invalid_shape(format!(
                    "expected a member access, found {}",
                    other.label()
                )));
            }
        }
    }

    names.reverse();
    Ok(names)
}

/// `x => x.a.b` becomes `"a.b"`.
pub fn path_of(lambda: &Lambda) -> ExprKitResult<String> {
    Ok(member_path(lambda)?.join("."))
}

/// `owner_type_name + "." + path_of(lambda)`.
pub fn full_path_of(lambda: &Lambda, owner_type_name: &str) -> ExprKitResult<String> {
    Ok(format!("{owner_type_name}.{}", path_of(lambda)?))
}

fn unwrap_conversion(body: &Expr) -> &Expr {
    match body.kind() {
        ExprKind::Convert { operand, .. } => operand,
        _ => body,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/path.rs"]
mod tests;

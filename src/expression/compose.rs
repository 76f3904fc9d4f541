//! Tree-level composition of predicates.
//!
//! The result of [`and`] / [`or`] is a new predicate tree, not a closure over the inputs, so it
//! can be displayed, compiled or composed again like any other predicate.

use smallvec::smallvec;

use crate::expression::ast::{BinaryOp, Expr};
use crate::expression::lambda::{Lambda, Predicate};
use crate::expression::rewrite::replace;
use crate::foundation::error::{ExprKitError, ExprKitResult};

/// `left && right` over one fresh parameter.
#[tracing::instrument(skip_all, level = "debug")]
pub fn and(left: Option<&Predicate>, right: Option<&Predicate>) -> ExprKitResult<Predicate> {
    combine(left, right, BinaryOp::And)
}

/// `left || right` over one fresh parameter.
#[tracing::instrument(skip_all, level = "debug")]
pub fn or(left: Option<&Predicate>, right: Option<&Predicate>) -> ExprKitResult<Predicate> {
    combine(left, right, BinaryOp::Or)
}

fn combine(
    left: Option<&Predicate>,
    right: Option<&Predicate>,
    op: BinaryOp,
) -> ExprKitResult<Predicate> {
    let left = left.ok_or_else(|| ExprKitError::null_argument("left"))?;
    let right = right.ok_or_else(|| ExprKitError::null_argument("right"))?;

    if left.input_type() != right.input_type() {
        return Err(ExprKitError::invalid_shape(format!(
            "cannot compose predicates over `{}` and `{}`",
            left.input_type(),
            right.input_type()
        )));
    }

    let name = left
        .param()
        .as_parameter()
        .map_or("x", |(name, _)| name)
        .to_owned();
    let param = Expr::parameter(name, left.input_type().clone());

    let lhs = replace(left.body(), left.param(), &param);
    let rhs = replace(right.body(), right.param(), &param);
    tracing::debug!(op = op.symbol(), "composed predicate bodies");

    Ok(Predicate::new_unchecked(Lambda::from_parts(
        smallvec![param],
        Expr::binary(op, lhs, rhs),
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/expression/compose.rs"]
mod tests;

//! Ordering comparisons selected by an operator token at run time.
//!
//! `evaluate_comparison(3, 5, "<")` builds `(a, b) => a < b`, compiles it and calls it once.
//! [`ComparatorCache`] keeps the compiled comparators around for repeated use.

use std::{fmt, str::FromStr, sync::Arc};

use dashmap::DashMap;
use smallvec::smallvec;

use crate::expression::ast::{BinaryOp, Expr};
use crate::expression::compile::{CompileOpts, CompiledLambda, compile};
use crate::expression::lambda::Lambda;
use crate::foundation::error::{ExprKitError, ExprKitResult};
use crate::foundation::value::{Value, ValueType};

/// The ordering operators a comparison token may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Parse `"<"`, `"<="`, `">"` or `">="`. Anything else is [`ExprKitError::NotSupported`].
    pub fn from_token(token: &str) -> ExprKitResult<Self> {
        match token {
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            other => Err(ExprKitError::not_supported(format!(
                "unknown comparison operator `{other}`"
            ))),
        }
    }

    /// Source token.
    pub fn token(self) -> &'static str {
        self.binary_op().symbol()
    }

    fn binary_op(self) -> BinaryOp {
        match self {
            Self::Lt => BinaryOp::Lt,
            Self::Le => BinaryOp::Le,
            Self::Gt => BinaryOp::Gt,
            Self::Ge => BinaryOp::Ge,
        }
    }
}

impl FromStr for CompareOp {
    type Err = ExprKitError;

    fn from_str(s: &str) -> ExprKitResult<Self> {
        Self::from_token(s)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// `(a: ty, b: ty) => a <op> b` over two fresh parameters.
pub fn build_comparison(value_type: ValueType, op: CompareOp) -> Lambda {
    let a = Expr::parameter("a", value_type.clone());
    let b = Expr::parameter("b", value_type);
    let body = Expr::binary(op.binary_op(), a.clone(), b.clone());
    Lambda::from_parts(smallvec![a, b], body)
}

/// Compare `a` with `b` using the operator named by `op_token`.
///
/// The comparator is typed after `a`; a `b` of an incompatible type fails with
/// [`ExprKitError::Evaluation`].
pub fn evaluate_comparison(
    a: impl Into<Value>,
    b: impl Into<Value>,
    op_token: &str,
) -> ExprKitResult<bool> {
    let op = CompareOp::from_token(op_token)?;
    let a = a.into();
    let lambda = build_comparison(a.value_type(), op);
    let compiled = compile(&lambda, CompileOpts::default())?;
    as_bool(compiled.call(&[a, b.into()])?)
}

fn as_bool(v: Value) -> ExprKitResult<bool> {
    v.as_bool().ok_or_else(|| {
        ExprKitError::evaluation(format!("comparison produced {}", v.kind_label()))
    })
}

/// Compiled comparators keyed by operand type and operator.
///
/// Safe to share across threads; lookups and inserts go through a [`DashMap`].
#[derive(Debug, Default)]
pub struct ComparatorCache {
    comparators: DashMap<(ValueType, CompareOp), Arc<CompiledLambda>>,
    opts: CompileOpts,
}

impl ComparatorCache {
    /// Empty cache compiling with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty cache compiling with `opts`.
    pub fn with_opts(opts: CompileOpts) -> Self {
        Self {
            comparators: DashMap::new(),
            opts,
        }
    }

    /// Same result as [`evaluate_comparison`], compiling each `(type, op)` pair once.
    pub fn evaluate(
        &self,
        a: impl Into<Value>,
        b: impl Into<Value>,
        op_token: &str,
    ) -> ExprKitResult<bool> {
        let op = CompareOp::from_token(op_token)?;
        let a = a.into();
        let compiled = self.comparator(a.value_type(), op)?;
        as_bool(compiled.call(&[a, b.into()])?)
    }

    /// Compiled comparator for `(value_type, op)`, compiling it on first use.
    pub fn comparator(
        &self,
        value_type: ValueType,
        op: CompareOp,
    ) -> ExprKitResult<Arc<CompiledLambda>> {
        let key = (value_type, op);
        if let Some(hit) = self.comparators.get(&key) {
            tracing::debug!(ty = %key.0, op = %op, "comparator cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        let compiled = Arc::new(compile(
            &build_comparison(key.0.clone(), op),
            self.opts,
        )?);
        tracing::debug!(ty = %key.0, op = %op, "comparator cache miss");
        Ok(Arc::clone(
            self.comparators.entry(key).or_insert(compiled).value(),
        ))
    }

    /// Number of cached comparators.
    pub fn len(&self) -> usize {
        self.comparators.len()
    }

    /// Return `true` when nothing has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.comparators.is_empty()
    }

    /// Drop every cached comparator.
    pub fn clear(&self) {
        self.comparators.clear();
    }
}

#[cfg(test)]
#[path = "../tests/unit/compare.rs"]
mod tests;

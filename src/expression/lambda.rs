use smallvec::SmallVec;

use crate::expression::ast::Expr;
use crate::expression::compile::{CompileOpts, CompiledLambda, CompiledPredicate, compile};
use crate::expression::{compose, path};
use crate::foundation::error::{ExprKitError, ExprKitResult};
use crate::foundation::value::{Value, ValueType};

/// Parameters bound to a body.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    params: SmallVec<[Expr; 2]>,
    body: Expr,
}

impl Lambda {
    /// Bind `params` to `body`.
    ///
    /// Every parameter must be a [`crate::ExprKind::Parameter`] node and appear once.
    pub fn new(params: impl IntoIterator<Item = Expr>, body: Expr) -> ExprKitResult<Self> {
        let params: SmallVec<[Expr; 2]> = params.into_iter().collect();
        for (i, p) in params.iter().enumerate() {
            if p.as_parameter().is_none() {
                return Err(ExprKitError::invalid_shape(format!(
                    "lambda parameter {i} is a {}",
                    p.kind().label()
                )));
            }
            if params[..i].iter().any(|q| q.ptr_eq(p)) {
                return Err(ExprKitError::invalid_shape(
                    "lambda binds the same parameter twice",
                ));
            }
        }
        Ok(Self { params, body })
    }

    pub(crate) fn from_parts(params: SmallVec<[Expr; 2]>, body: Expr) -> Self {
        Self { params, body }
    }

    /// Bound parameters in declaration order.
    pub fn params(&self) -> &[Expr] {
        &self.params
    }

    /// Body expression.
    pub fn body(&self) -> &Expr {
        &self.body
    }

    /// Number of bound parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// The only parameter, or `InvalidShape` when the lambda is not single-arity.
    pub fn single_param(&self) -> ExprKitResult<&Expr> {
        match self.params.as_slice() {
            [p] => Ok(p),
            other => Err(ExprKitError::invalid_shape(format!(
                "expected a single-parameter lambda, found {} parameters",
                other.len()
            ))),
        }
    }

    /// Lower into an executable program with default options.
    pub fn compile(&self) -> ExprKitResult<CompiledLambda> {
        compile(self, CompileOpts::default())
    }
}

/// Single-parameter lambda evaluated as a boolean test.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate(Lambda);

impl Predicate {
    /// Validate that `lambda` binds exactly one parameter.
    pub fn new(lambda: Lambda) -> ExprKitResult<Self> {
        lambda.single_param()?;
        Ok(Self(lambda))
    }

    pub(crate) fn new_unchecked(lambda: Lambda) -> Self {
        debug_assert_eq!(lambda.arity(), 1);
        Self(lambda)
    }

    /// Shorthand for `Predicate::new(Lambda::new([param], body)?)`.
    pub fn from_body(param: Expr, body: Expr) -> ExprKitResult<Self> {
        Self::new(Lambda::new([param], body)?)
    }

    /// Underlying lambda.
    pub fn lambda(&self) -> &Lambda {
        &self.0
    }

    /// Consume into the underlying lambda.
    pub fn into_lambda(self) -> Lambda {
        self.0
    }

    /// The bound parameter.
    pub fn param(&self) -> &Expr {
        &self.0.params()[0]
    }

    /// The body expression.
    pub fn body(&self) -> &Expr {
        self.0.body()
    }

    /// Declared type of the input parameter.
    pub fn input_type(&self) -> &ValueType {
        param_type(self.param())
    }

    /// `self && other`, composed at the tree level.
    pub fn and(&self, other: &Self) -> ExprKitResult<Self> {
        compose::and(Some(self), Some(other))
    }

    /// `self || other`, composed at the tree level.
    pub fn or(&self, other: &Self) -> ExprKitResult<Self> {
        compose::or(Some(self), Some(other))
    }

    /// Lower into an executable test with default options.
    pub fn compile(&self) -> ExprKitResult<CompiledPredicate> {
        CompiledPredicate::new(self, CompileOpts::default())
    }

    /// Compile and run once against `input`.
    pub fn evaluate(&self, input: &Value) -> ExprKitResult<bool> {
        self.compile()?.test(input)
    }
}

impl TryFrom<Lambda> for Predicate {
    type Error = ExprKitError;

    fn try_from(lambda: Lambda) -> ExprKitResult<Self> {
        Self::new(lambda)
    }
}

/// Single-parameter lambda that projects a value out of its input.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector(Lambda);

impl Selector {
    /// Validate that `lambda` binds exactly one parameter.
    pub fn new(lambda: Lambda) -> ExprKitResult<Self> {
        lambda.single_param()?;
        Ok(Self(lambda))
    }

    /// Underlying lambda.
    pub fn lambda(&self) -> &Lambda {
        &self.0
    }

    /// The bound parameter.
    pub fn param(&self) -> &Expr {
        &self.0.params()[0]
    }

    /// Declared type of the input parameter.
    pub fn input_type(&self) -> &ValueType {
        param_type(self.param())
    }

    /// Dotted member path, e.g. `address.city`.
    pub fn path(&self) -> ExprKitResult<String> {
        path::path_of(&self.0)
    }

    /// Member path prefixed with the parameter's record type name, e.g. `Person.address.city`.
    pub fn full_path(&self) -> ExprKitResult<String> {
        let owner = self.input_type().type_name().ok_or_else(|| {
            ExprKitError::invalid_shape(format!(
                "selector parameter type `{}` has no type name",
                self.input_type()
            ))
        })?;
        path::full_path_of(&self.0, owner)
    }

    /// Lower into an executable program with default options.
    pub fn compile(&self) -> ExprKitResult<CompiledLambda> {
        self.0.compile()
    }

    /// Compile and run once against `input`.
    pub fn evaluate(&self, input: &Value) -> ExprKitResult<Value> {
        self.compile()?.call(std::slice::from_ref(input))
    }
}

impl TryFrom<Lambda> for Selector {
    type Error = ExprKitError;

    fn try_from(lambda: Lambda) -> ExprKitResult<Self> {
        Self::new(lambda)
    }
}

static ANY: ValueType = ValueType::Any;

fn param_type(param: &Expr) -> &ValueType {
    match param.as_parameter() {
        Some((_, ty)) => ty,
        None => &ANY,
    }
}

use std::{fmt, sync::Arc};

use crate::expression::lambda::Lambda;
use crate::foundation::value::{Value, ValueType};

/// Handle to an immutable expression node.
///
/// Cloning a handle shares the node. Identity (see [`Expr::ptr_eq`]) is what binds a
/// parameter to its lambda; `==` compares structure.
#[derive(Clone)]
pub struct Expr(Arc<ExprKind>);

/// The node variants an expression tree is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Free variable bound by an enclosing lambda.
    Parameter {
        /// Display name; not used for binding.
        name: String,
        /// Declared type.
        ty: ValueType,
    },
    /// Literal value.
    Constant(Value),
    /// Named member of the parent's value.
    Member {
        /// Node whose value is read.
        parent: Expr,
        /// Member name.
        name: String,
    },
    /// Type coercion of a single operand.
    Convert {
        /// Converted node.
        operand: Expr,
        /// Target type.
        ty: ValueType,
    },
    /// Unary operator.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Expr,
    },
    /// Binary operator.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Expr,
        /// Right operand.
        right: Expr,
    },
    /// Method call, optionally on a target value.
    Call {
        /// Receiver, if the call was written `target.method(..)`.
        target: Option<Expr>,
        /// Method name.
        method: String,
        /// Arguments in order.
        args: Vec<Expr>,
    },
    /// `test ? if_true : if_false`.
    Conditional {
        /// Boolean test.
        test: Expr,
        /// Taken when `test` is true.
        if_true: Expr,
        /// Taken when `test` is false.
        if_false: Expr,
    },
    /// Nested lambda.
    Lambda(Lambda),
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Numeric negation.
    Neg,
    /// Boolean negation.
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
}

impl UnaryOp {
    /// Source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
        }
    }
}

impl BinaryOp {
    /// Source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Return `true` for `<`, `<=`, `>` and `>=`.
    pub fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    /// Return `true` for `&&` and `||`.
    pub fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

impl ExprKind {
    /// Short label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Parameter { .. } => "parameter",
            Self::Constant(_) => "constant",
            Self::Member { .. } => "member access",
            Self::Convert { .. } => "conversion",
            Self::Unary { .. } => "unary operation",
            Self::Binary { .. } => "binary operation",
            Self::Call { .. } => "method call",
            Self::Conditional { .. } => "conditional",
            Self::Lambda(_) => "lambda",
        }
    }
}

impl Expr {
    pub(crate) fn new(kind: ExprKind) -> Self {
        Self(Arc::new(kind))
    }

    /// Fresh parameter. Every call creates a distinct node.
    pub fn parameter(name: impl Into<String>, ty: ValueType) -> Self {
        Self::new(ExprKind::Parameter {
            name: name.into(),
            ty,
        })
    }

    /// Literal node.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::new(ExprKind::Constant(value.into()))
    }

    /// `self.name`
    pub fn member(&self, name: impl Into<String>) -> Self {
        Self::new(ExprKind::Member {
            parent: self.clone(),
            name: name.into(),
        })
    }

    /// `self as ty`
    pub fn convert(&self, ty: ValueType) -> Self {
        Self::new(ExprKind::Convert {
            operand: self.clone(),
            ty,
        })
    }

    /// Unary node.
    pub fn unary(op: UnaryOp, operand: Self) -> Self {
        Self::new(ExprKind::Unary { op, operand })
    }

    /// Binary node.
    pub fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::new(ExprKind::Binary { op, left, right })
    }

    /// Call node.
    pub fn call(target: Option<Self>, method: impl Into<String>, args: Vec<Self>) -> Self {
        Self::new(ExprKind::Call {
            target,
            method: method.into(),
            args,
        })
    }

    /// Conditional node.
    pub fn conditional(test: Self, if_true: Self, if_false: Self) -> Self {
        Self::new(ExprKind::Conditional {
            test,
            if_true,
            if_false,
        })
    }

    /// Wrap a lambda as a node.
    pub fn lambda(lambda: Lambda) -> Self {
        Self::new(ExprKind::Lambda(lambda))
    }

    /// The node's variant.
    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    /// Reference identity: `true` only when both handles point at the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Name and type, if this node is a parameter.
    pub fn as_parameter(&self) -> Option<(&str, &ValueType)> {
        match self.kind() {
            ExprKind::Parameter { name, ty } => Some((name, ty)),
            _ => None,
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/ast.rs"]
mod tests;

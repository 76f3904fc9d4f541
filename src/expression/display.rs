//! Source-text rendering.
//!
//! Output is fully parenthesized and parses back into a structurally equal tree for anything
//! [`crate::parse_lambda`] can produce.

use std::fmt;

use crate::expression::ast::{Expr, ExprKind};
use crate::expression::lambda::{Lambda, Predicate, Selector};
use crate::foundation::value::{Value, ValueType};

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Parameter { name, .. } => f.write_str(name),
            ExprKind::Constant(v) => write_constant(f, v),
            ExprKind::Member { parent, name } => {
                write_receiver(f, parent)?;
                write!(f, ".{name}")
            }
            ExprKind::Convert { operand, ty } => write!(f, "({operand} as {ty})"),
            ExprKind::Unary { op, operand } => {
                f.write_str(op.symbol())?;
                match operand.kind() {
                    ExprKind::Constant(_) => write!(f, "({operand})"),
                    _ => write!(f, "{operand}"),
                }
            }
            ExprKind::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
            ExprKind::Call {
                target,
                method,
                args,
            } => {
                if let Some(t) = target {
                    write_receiver(f, t)?;
                    f.write_str(".")?;
                }
                write!(f, "{method}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(")")
            }
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => write!(f, "({test} ? {if_true} : {if_false})"),
            ExprKind::Lambda(l) => write!(f, "({l})"),
        }
    }
}

fn write_constant(f: &mut fmt::Formatter<'_>, v: &Value) -> fmt::Result {
    match v {
        Value::Int(i) if *i < 0 => write!(f, "({v})"),
        Value::Float(x) if x.is_sign_negative() => write!(f, "({v})"),
        _ => write!(f, "{v}"),
    }
}

/// Postfix receivers bind tighter than prefix operators.
fn write_receiver(f: &mut fmt::Formatter<'_>, e: &Expr) -> fmt::Result {
    match e.kind() {
        ExprKind::Unary { .. } => write!(f, "({e})"),
        _ => write!(f, "{e}"),
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params();
        let bare = match params {
            [p] => p
                .as_parameter()
                .is_some_and(|(_, ty)| *ty == ValueType::Any),
            _ => false,
        };
        if bare {
            write!(f, "{}", params[0])?;
        } else {
            f.write_str("(")?;
            for (i, p) in params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                match p.as_parameter() {
                    Some((name, ValueType::Any)) => f.write_str(name)?,
                    Some((name, ty)) => write!(f, "{name}: {ty}")?,
                    None => write!(f, "{p}")?,
                }
            }
            f.write_str(")")?;
        }
        write!(f, " => {}", self.body())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.lambda().fmt(f)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.lambda().fmt(f)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/display.rs"]
mod tests;

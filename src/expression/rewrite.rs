use smallvec::SmallVec;

use crate::expression::ast::{Expr, ExprKind};
use crate::expression::lambda::Lambda;

/// Copy of `root` with every occurrence of the node `target` (by identity) replaced by
/// `replacement`.
///
/// A matched node is swapped without descending into `replacement`. Subtrees that contain no
/// match are shared with the input; the input itself is never modified.
pub(crate) fn replace(root: &Expr, target: &Expr, replacement: &Expr) -> Expr {
    Replace {
        target,
        replacement,
    }
    .visit(root)
}

struct Replace<'a> {
    target: &'a Expr,
    replacement: &'a Expr,
}

impl Replace<'_> {
    fn visit(&self, e: &Expr) -> Expr {
        if e.ptr_eq(self.target) {
            return self.replacement.clone();
        }

        match e.kind() {
            ExprKind::Parameter { .. } | ExprKind::Constant(_) => e.clone(),
            ExprKind::Member { parent, name } => {
                let parent2 = self.visit(parent);
                if parent2.ptr_eq(parent) {
                    return e.clone();
                }
                Expr::new(ExprKind::Member {
                    parent: parent2,
                    name: name.clone(),
                })
            }
            ExprKind::Convert { operand, ty } => {
                let operand2 = self.visit(operand);
                if operand2.ptr_eq(operand) {
                    return e.clone();
                }
                Expr::new(ExprKind::Convert {
                    operand: operand2,
                    ty: ty.clone(),
                })
            }
            ExprKind::Unary { op, operand } => {
                let operand2 = self.visit(operand);
                if operand2.ptr_eq(operand) {
                    return e.clone();
                }
                Expr::unary(*op, operand2)
            }
            ExprKind::Binary { op, left, right } => {
                let left2 = self.visit(left);
                let right2 = self.visit(right);
                if left2.ptr_eq(left) && right2.ptr_eq(right) {
                    return e.clone();
                }
                Expr::binary(*op, left2, right2)
            }
            ExprKind::Call {
                target,
                method,
                args,
            } => {
                let target2 = target.as_ref().map(|t| self.visit(t));
                let args2: Vec<Expr> = args.iter().map(|a| self.visit(a)).collect();
                let target_same = match (target, &target2) {
                    (Some(a), Some(b)) => a.ptr_eq(b),
                    _ => true,
                };
                if target_same && all_same(args, &args2) {
                    return e.clone();
                }
                Expr::call(target2, method.clone(), args2)
            }
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => {
                let test2 = self.visit(test);
                let if_true2 = self.visit(if_true);
                let if_false2 = self.visit(if_false);
                if test2.ptr_eq(test) && if_true2.ptr_eq(if_true) && if_false2.ptr_eq(if_false) {
                    return e.clone();
                }
                Expr::conditional(test2, if_true2, if_false2)
            }
            ExprKind::Lambda(lambda) => {
                let params2: SmallVec<[Expr; 2]> =
                    lambda.params().iter().map(|p| self.visit(p)).collect();
                let body2 = self.visit(lambda.body());
                if all_same(lambda.params(), &params2) && body2.ptr_eq(lambda.body()) {
                    return e.clone();
                }
                Expr::lambda(Lambda::from_parts(params2, body2))
            }
        }
    }
}

fn all_same(a: &[Expr], b: &[Expr]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.ptr_eq(y))
}

#[cfg(test)]
#[path = "../../tests/unit/expression/rewrite.rs"]
mod tests;

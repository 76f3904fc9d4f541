use crate::expression::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::expression::bytecode::{BytecodeProgram, MethodId, Op};
use crate::expression::lambda::Lambda;
use crate::foundation::error::{ExprKitError, ExprKitResult};

pub(crate) fn lower_lambda(lambda: &Lambda) -> ExprKitResult<BytecodeProgram> {
    if lambda.arity() > usize::from(u8::MAX) {
        return Err(ExprKitError::not_supported(format!(
            "lambdas with {} parameters",
            lambda.arity()
        )));
    }
    let mut p = BytecodeProgram::new();
    lower_expr(lambda.body(), lambda.params(), &mut p)?;
    Ok(p)
}

fn lower_expr(e: &Expr, params: &[Expr], out: &mut BytecodeProgram) -> ExprKitResult<()> {
    match e.kind() {
        ExprKind::Parameter { name, .. } => {
            let Some(slot) = params.iter().position(|p| p.ptr_eq(e)) else {
                return Err(ExprKitError::invalid_shape(format!(
                    "parameter `{name}` is not bound by the enclosing lambda"
                )));
            };
            out.ops.push(Op::LoadArg(slot as u8));
        }
        ExprKind::Constant(v) => {
            let idx = out.push_const(v.clone());
            out.ops.push(Op::PushConst(idx));
        }
        ExprKind::Member { parent, name } => {
            lower_expr(parent, params, out)?;
            let idx = out.push_name(name);
            out.ops.push(Op::LoadMember(idx));
        }
        ExprKind::Convert { operand, ty } => {
            lower_expr(operand, params, out)?;
            let idx = out.push_type(ty);
            out.ops.push(Op::Convert(idx));
        }
        ExprKind::Unary { op, operand } => {
            lower_expr(operand, params, out)?;
            out.ops.push(match op {
                UnaryOp::Neg => Op::Neg,
                UnaryOp::Not => Op::Not,
            });
        }
        ExprKind::Binary {
            op: op @ (BinaryOp::And | BinaryOp::Or),
            left,
            right,
        } => {
            lower_expr(left, params, out)?;
            let jump = out.here();
            out.ops.push(if *op == BinaryOp::And {
                Op::AndElse(0)
            } else {
                Op::OrElse(0)
            });
            lower_expr(right, params, out)?;
            out.ops.push(Op::CheckBool);
            let end = out.here();
            out.patch_jump(jump, end);
        }
        ExprKind::Binary { op, left, right } => {
            lower_expr(left, params, out)?;
            lower_expr(right, params, out)?;
            out.ops.push(match op {
                BinaryOp::Add => Op::Add,
                BinaryOp::Sub => Op::Sub,
                BinaryOp::Mul => Op::Mul,
                BinaryOp::Div => Op::Div,
                BinaryOp::Mod => Op::Mod,
                BinaryOp::Eq => Op::Eq,
                BinaryOp::Ne => Op::Ne,
                BinaryOp::Lt => Op::Lt,
                BinaryOp::Le => Op::Le,
                BinaryOp::Gt => Op::Gt,
                BinaryOp::Ge => Op::Ge,
                BinaryOp::And | BinaryOp::Or => unreachable!("logical ops are lowered above"),
            });
        }
        ExprKind::Call {
            target,
            method,
            args,
        } => {
            let id = MethodId::from_name(method).ok_or_else(|| {
                ExprKitError::not_supported(format!("unknown method `{method}`"))
            })?;
            let argc = args.len() + usize::from(target.is_some());
            if argc != id.operands() {
                return Err(ExprKitError::invalid_shape(format!(
                    "`{}` expects {} operand(s), got {argc}",
                    id.name(),
                    id.operands()
                )));
            }
            if let Some(t) = target {
                lower_expr(t, params, out)?;
            }
            for a in args {
                lower_expr(a, params, out)?;
            }
            out.ops.push(Op::CallMethod {
                id,
                argc: argc as u8,
            });
        }
        ExprKind::Conditional {
            test,
            if_true,
            if_false,
        } => {
            lower_expr(test, params, out)?;
            let to_else = out.here();
            out.ops.push(Op::JumpIfFalse(0));
            lower_expr(if_true, params, out)?;
            let to_end = out.here();
            out.ops.push(Op::Jump(0));
            let else_start = out.here();
            out.patch_jump(to_else, else_start);
            lower_expr(if_false, params, out)?;
            let end = out.here();
            out.patch_jump(to_end, end);
        }
        ExprKind::Lambda(_) => {
            return Err(ExprKitError::not_supported(
                "nested lambdas cannot be lowered to bytecode",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/expression/lower.rs"]
mod tests;

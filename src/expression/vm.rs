use std::cmp::Ordering;

use crate::expression::bytecode::{BytecodeProgram, MethodId, Op};
use crate::foundation::error::{ExprKitError, ExprKitResult};
use crate::foundation::value::Value;

pub(crate) fn eval_program(
    p: &BytecodeProgram,
    args: &[Value],
    max_stack: usize,
) -> ExprKitResult<Value> {
    let mut stack: Vec<Value> = Vec::with_capacity(max_stack.min(16));
    eval_program_with_stack(p, args, max_stack, &mut stack)
}

pub(crate) fn eval_program_with_stack(
    p: &BytecodeProgram,
    args: &[Value],
    max_stack: usize,
    stack: &mut Vec<Value>,
) -> ExprKitResult<Value> {
    stack.clear();
    let mut pc = 0usize;

    while let Some(&op) = p.ops.get(pc) {
        pc += 1;
        match op {
            Op::PushConst(idx) => {
                let c = p
                    .consts
                    .get(idx.0 as usize)
                    .ok_or_else(|| ExprKitError::evaluation("const idx out of range"))?;
                push(stack, c.clone(), max_stack)?;
            }
            Op::LoadArg(slot) => {
                let v = args
                    .get(usize::from(slot))
                    .ok_or_else(|| ExprKitError::evaluation(format!("missing argument {slot}")))?;
                push(stack, v.clone(), max_stack)?;
            }
            Op::LoadMember(idx) => {
                let name = p
                    .names
                    .get(idx.0 as usize)
                    .ok_or_else(|| ExprKitError::evaluation("name idx out of range"))?;
                let v = pop(stack)?.member(name)?;
                stack.push(v);
            }
            Op::Convert(idx) => {
                let ty = p
                    .types
                    .get(idx.0 as usize)
                    .ok_or_else(|| ExprKitError::evaluation("type idx out of range"))?;
                let v = pop(stack)?.convert(ty)?;
                stack.push(v);
            }

            Op::Neg => {
                let v = match pop(stack)? {
                    Value::Int(v) => Value::Int(
                        v.checked_neg()
                            .ok_or_else(|| ExprKitError::evaluation("integer overflow in negation"))?,
                    ),
                    Value::Float(v) => Value::Float(-v),
                    other => return Err(type_error("numeric", &other)),
                };
                stack.push(v);
            }
            Op::Not => {
                let v = pop_bool(stack)?;
                stack.push(Value::Bool(!v));
            }
            Op::Add => bin_add(stack)?,
            Op::Sub => bin_arith(stack, "-", i64::checked_sub, |a, b| a - b)?,
            Op::Mul => bin_arith(stack, "*", i64::checked_mul, |a, b| a * b)?,
            Op::Div => bin_arith(stack, "/", i64::checked_div, |a, b| a / b)?,
            Op::Mod => bin_arith(stack, "%", i64::checked_rem, |a, b| a % b)?,

            Op::Eq => bin_eq(stack, true)?,
            Op::Ne => bin_eq(stack, false)?,
            Op::Lt => bin_cmp(stack, Ordering::is_lt)?,
            Op::Le => bin_cmp(stack, Ordering::is_le)?,
            Op::Gt => bin_cmp(stack, Ordering::is_gt)?,
            Op::Ge => bin_cmp(stack, Ordering::is_ge)?,

            Op::AndElse(target) => {
                if peek_bool(stack)? {
                    stack.pop();
                } else {
                    pc = target as usize;
                }
            }
            Op::OrElse(target) => {
                if peek_bool(stack)? {
                    pc = target as usize;
                } else {
                    stack.pop();
                }
            }
            Op::CheckBool => {
                peek_bool(stack)?;
            }
            Op::JumpIfFalse(target) => {
                if !pop_bool(stack)? {
                    pc = target as usize;
                }
            }
            Op::Jump(target) => pc = target as usize,

            Op::CallMethod { id, argc } => call_method(stack, id, argc)?,
        }
    }

    if stack.len() != 1 {
        return Err(ExprKitError::evaluation(format!(
            "stack has {} values at end of program",
            stack.len()
        )));
    }
    pop(stack)
}

fn push(stack: &mut Vec<Value>, v: Value, max_stack: usize) -> ExprKitResult<()> {
    if stack.len() >= max_stack {
        return Err(ExprKitError::evaluation(format!(
            "stack depth exceeds {max_stack}"
        )));
    }
    stack.push(v);
    Ok(())
}

fn pop(stack: &mut Vec<Value>) -> ExprKitResult<Value> {
    stack
        .pop()
        .ok_or_else(|| ExprKitError::evaluation("stack underflow"))
}

fn pop_bool(stack: &mut Vec<Value>) -> ExprKitResult<bool> {
    match pop(stack)? {
        Value::Bool(v) => Ok(v),
        other => Err(type_error("bool", &other)),
    }
}

fn peek_bool(stack: &[Value]) -> ExprKitResult<bool> {
    match stack.last() {
        Some(Value::Bool(v)) => Ok(*v),
        Some(other) => Err(type_error("bool", other)),
        None => Err(ExprKitError::evaluation("stack underflow")),
    }
}

fn pop_str(stack: &mut Vec<Value>) -> ExprKitResult<String> {
    match pop(stack)? {
        Value::Str(s) => Ok(s),
        other => Err(type_error("str", &other)),
    }
}

fn type_error(expected: &str, got: &Value) -> ExprKitError {
    ExprKitError::evaluation(format!("expected {expected}, got {}", got.kind_label()))
}

fn bin_add(stack: &mut Vec<Value>) -> ExprKitResult<()> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    let out = match (a, b) {
        (Value::Str(mut a), Value::Str(b)) => {
            a.push_str(&b);
            Value::Str(a)
        }
        (a, b) => arith(a, b, "+", i64::checked_add, |a, b| a + b)?,
    };
    stack.push(out);
    Ok(())
}

fn bin_arith(
    stack: &mut Vec<Value>,
    symbol: &str,
    int_op: impl FnOnce(i64, i64) -> Option<i64>,
    float_op: impl FnOnce(f64, f64) -> f64,
) -> ExprKitResult<()> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    stack.push(arith(a, b, symbol, int_op, float_op)?);
    Ok(())
}

fn arith(
    a: Value,
    b: Value,
    symbol: &str,
    int_op: impl FnOnce(i64, i64) -> Option<i64>,
    float_op: impl FnOnce(f64, f64) -> f64,
) -> ExprKitResult<Value> {
    match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => int_op(*x, *y).map(Value::Int).ok_or_else(|| {
            ExprKitError::evaluation(format!("integer overflow or division by zero in `{x} {symbol} {y}`"))
        }),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(Value::Float(float_op(x, y))),
            _ => Err(ExprKitError::evaluation(format!(
                "cannot apply `{symbol}` to {} and {}",
                a.kind_label(),
                b.kind_label()
            ))),
        },
    }
}

fn bin_eq(stack: &mut Vec<Value>, is_eq: bool) -> ExprKitResult<()> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    let res = a.loose_eq(&b);
    stack.push(Value::Bool(if is_eq { res } else { !res }));
    Ok(())
}

fn bin_cmp(stack: &mut Vec<Value>, f: impl FnOnce(Ordering) -> bool) -> ExprKitResult<()> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    // Unordered numbers (NaN) fail every ordering test.
    let res = a.partial_compare(&b)?.is_some_and(f);
    stack.push(Value::Bool(res));
    Ok(())
}

fn call_method(stack: &mut Vec<Value>, id: MethodId, argc: u8) -> ExprKitResult<()> {
    let argc = usize::from(argc);
    if argc != id.operands() {
        return Err(ExprKitError::evaluation(format!(
            "`{}` expects {} operand(s), got {argc}",
            id.name(),
            id.operands()
        )));
    }
    if stack.len() < argc {
        return Err(ExprKitError::evaluation("stack underflow in method call"));
    }

    let out = match id {
        MethodId::Len => Value::Int(pop_str(stack)?.chars().count() as i64),
        MethodId::Lower => Value::Str(pop_str(stack)?.to_lowercase()),
        MethodId::Upper => Value::Str(pop_str(stack)?.to_uppercase()),
        MethodId::Trim => Value::Str(pop_str(stack)?.trim().to_owned()),
        MethodId::Contains | MethodId::StartsWith | MethodId::EndsWith => {
            let needle = pop_str(stack)?;
            let hay = pop_str(stack)?;
            Value::Bool(match id {
                MethodId::Contains => hay.contains(needle.as_str()),
                MethodId::StartsWith => hay.starts_with(needle.as_str()),
                _ => hay.ends_with(needle.as_str()),
            })
        }
        MethodId::Abs => match pop(stack)? {
            Value::Int(v) => Value::Int(
                v.checked_abs()
                    .ok_or_else(|| ExprKitError::evaluation("integer overflow in abs"))?,
            ),
            Value::Float(v) => Value::Float(v.abs()),
            other => return Err(type_error("numeric", &other)),
        },
        MethodId::Min | MethodId::Max => {
            let b = pop(stack)?;
            let a = pop(stack)?;
            let ord = a.compare(&b)?;
            let take_a = if id == MethodId::Min {
                ord.is_le()
            } else {
                ord.is_ge()
            };
            if take_a { a } else { b }
        }
        MethodId::IsNull => Value::Bool(pop(stack)?.is_null()),
    };
    stack.push(out);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/expression/vm.rs"]
mod tests;

//! Lowering of lambdas into executable programs.

use smallvec::SmallVec;

use crate::expression::bytecode::BytecodeProgram;
use crate::expression::lambda::{Lambda, Predicate};
use crate::expression::lower::lower_lambda;
use crate::expression::vm::{eval_program, eval_program_with_stack};
use crate::foundation::error::{ExprKitError, ExprKitResult};
use crate::foundation::value::{Value, ValueType};

/// Options for [`compile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOpts {
    /// Upper bound on the VM operand stack. Programs that need more fail with
    /// [`ExprKitError::Evaluation`].
    pub max_stack_depth: usize,
}

impl Default for CompileOpts {
    fn default() -> Self {
        Self {
            max_stack_depth: 256,
        }
    }
}

/// A lambda lowered to bytecode, callable any number of times.
#[derive(Debug, Clone)]
pub struct CompiledLambda {
    program: BytecodeProgram,
    param_types: SmallVec<[ValueType; 2]>,
    opts: CompileOpts,
}

/// Compile `lambda` with `opts`.
#[tracing::instrument(skip_all, level = "debug", fields(arity = lambda.arity()))]
pub fn compile(lambda: &Lambda, opts: CompileOpts) -> ExprKitResult<CompiledLambda> {
    let program = lower_lambda(lambda)?;
    tracing::debug!(
        ops = program.ops.len(),
        consts = program.consts.len(),
        "lowered lambda"
    );
    let param_types = lambda
        .params()
        .iter()
        .map(|p| p.as_parameter().map_or(ValueType::Any, |(_, ty)| ty.clone()))
        .collect();
    Ok(CompiledLambda {
        program,
        param_types,
        opts,
    })
}

impl CompiledLambda {
    /// Number of arguments [`CompiledLambda::call`] expects.
    pub fn arity(&self) -> usize {
        self.param_types.len()
    }

    /// Options the lambda was compiled with.
    pub fn opts(&self) -> CompileOpts {
        self.opts
    }

    /// Run the program with `args` bound to the parameters in order.
    pub fn call(&self, args: &[Value]) -> ExprKitResult<Value> {
        self.check_args(args)?;
        eval_program(&self.program, args, self.opts.max_stack_depth)
    }

    /// Like [`CompiledLambda::call`], reusing `stack` between calls.
    pub(crate) fn call_with_stack(
        &self,
        args: &[Value],
        stack: &mut Vec<Value>,
    ) -> ExprKitResult<Value> {
        self.check_args(args)?;
        eval_program_with_stack(&self.program, args, self.opts.max_stack_depth, stack)
    }

    fn check_args(&self, args: &[Value]) -> ExprKitResult<()> {
        if args.len() != self.arity() {
            return Err(ExprKitError::invalid_shape(format!(
                "lambda takes {} argument(s), got {}",
                self.arity(),
                args.len()
            )));
        }
        for (i, (ty, arg)) in self.param_types.iter().zip(args).enumerate() {
            if !ty.accepts(arg) {
                return Err(ExprKitError::evaluation(format!(
                    "argument {i} is {}, expected {ty}",
                    arg.kind_label()
                )));
            }
        }
        Ok(())
    }
}

/// A compiled predicate: a single-argument program that must produce a bool.
#[derive(Debug, Clone)]
pub struct CompiledPredicate {
    inner: CompiledLambda,
}

impl CompiledPredicate {
    /// Compile `predicate` with `opts`.
    pub fn new(predicate: &Predicate, opts: CompileOpts) -> ExprKitResult<Self> {
        Ok(Self {
            inner: compile(predicate.lambda(), opts)?,
        })
    }

    /// Evaluate against `input`.
    pub fn test(&self, input: &Value) -> ExprKitResult<bool> {
        expect_bool(self.inner.call(std::slice::from_ref(input))?)
    }

    pub(crate) fn test_with_stack(
        &self,
        input: &Value,
        stack: &mut Vec<Value>,
    ) -> ExprKitResult<bool> {
        expect_bool(
            self.inner
                .call_with_stack(std::slice::from_ref(input), stack)?,
        )
    }

    /// The underlying compiled lambda.
    pub fn as_lambda(&self) -> &CompiledLambda {
        &self.inner
    }
}

fn expect_bool(v: Value) -> ExprKitResult<bool> {
    match v {
        Value::Bool(b) => Ok(b),
        other => Err(ExprKitError::evaluation(format!(
            "predicate produced {}, expected bool",
            other.kind_label()
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/compile.rs"]
mod tests;

//! exprkit builds, composes, inspects and executes small typed expression trees.
//!
//! Trees are immutable [`Expr`] nodes bound into [`Lambda`]s. On top of that:
//!
//! - **Compose**: [`and`] / [`or`] merge two [`Predicate`]s into one tree over a fresh parameter
//! - **Inspect**: [`path_of`] turns `p => p.address.city` into `"address.city"`
//! - **Execute**: [`compile`] lowers a lambda to bytecode run by a small stack VM
//! - **Compare**: [`evaluate_comparison`] picks `<`, `<=`, `>` or `>=` from a token at run time
//! - **Query**: [`filter`], [`order_by`] and [`next_sort_order`] over in-memory records
//!
//! Lambdas can be written directly in source form with [`parse_lambda`] and rendered back with
//! `Display`:
//!
//! ```
//! use exprkit::parse_predicate;
//!
//! let adult = parse_predicate("p => p.age >= 18").unwrap();
//! let named = parse_predicate(r#"p => p.name.starts_with("A")"#).unwrap();
//! let both = adult.and(&named).unwrap();
//! assert_eq!(
//!     both.to_string(),
//!     r#"p => ((p.age >= 18) && p.name.starts_with("A"))"#
//! );
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod compare;
mod expression;
mod foundation;
mod query;

pub use crate::compare::{CompareOp, ComparatorCache, build_comparison, evaluate_comparison};
pub use crate::expression::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use crate::expression::compile::{CompileOpts, CompiledLambda, CompiledPredicate, compile};
pub use crate::expression::compose::{and, or};
pub use crate::expression::lambda::{Lambda, Predicate, Selector};
pub use crate::expression::parser::{parse_lambda, parse_predicate, parse_selector};
pub use crate::expression::path::{full_path_of, member_path, path_of};
pub use crate::foundation::error::{ExprKitError, ExprKitResult};
pub use crate::foundation::value::{Record, Value, ValueType};
pub use crate::query::{QueryOpts, SortDirection, filter, next_sort_order, order_by};

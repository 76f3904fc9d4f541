//! Predicate and selector helpers over in-memory record sets.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::expression::compile::{CompileOpts, CompiledLambda, CompiledPredicate};
use crate::expression::lambda::{Predicate, Selector};
use crate::foundation::error::{ExprKitError, ExprKitResult};
use crate::foundation::value::Value;

/// Sort direction for [`order_by`] keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Smallest first; `Null` keys lead.
    #[default]
    Ascending,
    /// Largest first; `Null` keys trail.
    Descending,
}

/// Options controlling [`filter`].
#[derive(Clone, Debug)]
pub struct QueryOpts {
    /// Evaluate the predicate across records with rayon.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Options used to compile the predicate.
    pub compile: CompileOpts,
}

impl Default for QueryOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            compile: CompileOpts::default(),
        }
    }
}

/// Records for which `predicate` holds, in input order.
#[tracing::instrument(skip_all, fields(records = records.len(), parallel = opts.parallel))]
pub fn filter(
    records: &[Value],
    predicate: &Predicate,
    opts: &QueryOpts,
) -> ExprKitResult<Vec<Value>> {
    let compiled = CompiledPredicate::new(predicate, opts.compile)?;

    let keep: Vec<bool> = if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        pool.install(|| {
            records
                .par_iter()
                .map_init(Vec::new, |stack, r| compiled.test_with_stack(r, stack))
                .collect::<ExprKitResult<Vec<_>>>()
        })?
    } else {
        let mut stack = Vec::new();
        records
            .iter()
            .map(|r| compiled.test_with_stack(r, &mut stack))
            .collect::<ExprKitResult<Vec<_>>>()?
    };

    let out: Vec<Value> = records
        .iter()
        .zip(keep)
        .filter_map(|(r, k)| k.then(|| r.clone()))
        .collect();
    tracing::debug!(kept = out.len(), "filtered records");
    Ok(out)
}

/// Stable multi-key sort. The first key is primary; later keys break ties.
///
/// Keys that cannot be ordered against each other fail with [`ExprKitError::Evaluation`].
pub fn order_by(records: &[Value], keys: &[(Selector, SortDirection)]) -> ExprKitResult<Vec<Value>> {
    let selectors: Vec<(CompiledLambda, SortDirection)> = keys
        .iter()
        .map(|(s, dir)| Ok((s.compile()?, *dir)))
        .collect::<ExprKitResult<_>>()?;

    let mut rows: Vec<(Vec<Value>, &Value)> = Vec::with_capacity(records.len());
    let mut stack = Vec::new();
    for r in records {
        let mut row = Vec::with_capacity(selectors.len());
        for (sel, _) in &selectors {
            row.push(sel.call_with_stack(std::slice::from_ref(r), &mut stack)?);
        }
        rows.push((row, r));
    }

    for i in 0..selectors.len() {
        check_comparable(rows.iter().map(|(row, _)| &row[i]))?;
    }
    rows.sort_by(|(a, _), (b, _)| {
        for (i, (_, dir)) in selectors.iter().enumerate() {
            let ord = key_ordering(&a[i], &b[i]);
            let ord = match dir {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    tracing::debug!(records = rows.len(), keys = keys.len(), "ordered records");
    Ok(rows.into_iter().map(|(_, r)| r.clone()).collect())
}

/// Every non-null key must order against the first non-null key; keys that do are totally
/// ordered among themselves.
fn check_comparable<'a>(keys: impl Iterator<Item = &'a Value>) -> ExprKitResult<()> {
    let mut first: Option<&Value> = None;
    for k in keys.filter(|k| !k.is_null()) {
        match first {
            None => {
                k.compare(k)?;
                first = Some(k);
            }
            Some(f) => {
                f.compare(k)?;
            }
        }
    }
    Ok(())
}

fn key_ordering(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}

/// One past the largest integer `key` among records matching `filter`, or `0` when none match.
///
/// `Null` keys are skipped; any other non-integer key fails with [`ExprKitError::Evaluation`].
pub fn next_sort_order(
    records: &[Value],
    key: &Selector,
    filter: Option<&Predicate>,
) -> ExprKitResult<i64> {
    let key = key.compile()?;
    let filter = filter.map(Predicate::compile).transpose()?;

    let mut max: Option<i64> = None;
    let mut stack = Vec::new();
    for r in records {
        if let Some(f) = &filter
            && !f.test_with_stack(r, &mut stack)?
        {
            continue;
        }
        match key.call_with_stack(std::slice::from_ref(r), &mut stack)? {
            Value::Null => {}
            Value::Int(v) => max = Some(max.map_or(v, |m| m.max(v))),
            other => {
                return Err(ExprKitError::evaluation(format!(
                    "sort order key must be an int, got {}",
                    other.kind_label()
                )));
            }
        }
    }

    match max {
        None => Ok(0),
        Some(m) => m
            .checked_add(1)
            .ok_or_else(|| ExprKitError::evaluation("sort order overflow")),
    }
}

fn build_thread_pool(threads: Option<usize>) -> ExprKitResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ExprKitError::invalid_shape(
            "query 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ExprKitError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/query.rs"]
mod tests;

//! Range partitioners: boundary values in, AND-only predicates out.
//!
//! A composite-key interval `[low, high)` is a lexicographic range, which in
//! general needs `OR` to express as one predicate. Instead it is split into
//! disjoint bands that are each a plain conjunction:
//!
//! - lower band: `c1 = l1` and the tail at or above `(l2..ln)`,
//! - middle band: `c1 > l1 AND c1 < h1` with the tail unconstrained,
//! - upper band: `c1 = h1` and the tail below (or at, for the last slice)
//!   `(h2..hn)`.
//!
//! The tail expansions recurse one column at a time, so an `n`-column
//! interval yields at most `2 * (n - 1) + 1` predicates.

use crate::boundary::{BoundaryList, SliceInterval};
use crate::error::PlanError;
use crate::predicate::{CompareOp, Comparison, Predicate};
use crate::value::{KeySchema, KeyValue};

/// Plans predicates for every interval of `boundaries`, in boundary order.
///
/// Single-column keys use [`partition_single`]; composite keys use
/// [`partition_interval`] per consecutive boundary pair. An empty boundary
/// list plans nothing.
pub fn plan_predicates(
    schema: &KeySchema,
    boundaries: &BoundaryList,
) -> Result<Vec<Predicate>, PlanError> {
    for tuple in boundaries.tuples() {
        check_arity(schema.arity(), tuple.len())?;
    }
    if schema.arity() == 1 {
        let values = boundaries
            .tuples()
            .iter()
            .map(|tuple| tuple[0].clone())
            .collect::<Vec<_>>();
        return Ok(partition_single(&schema.columns()[0], &values));
    }

    let mut predicates = Vec::new();
    for interval in boundaries.intervals() {
        predicates.extend(partition_interval(schema.columns(), &interval)?);
    }
    Ok(predicates)
}

/// Single-column ranges over ordered boundary values.
///
/// Adjacent duplicates collapse first; a lone value is paired with itself.
/// Every range is `col >= lo AND col < hi` except the last, which closes with
/// `col <= hi` so the maximum key is included.
pub fn partition_single(column: &str, boundaries: &[KeyValue]) -> Vec<Predicate> {
    let mut values: Vec<&KeyValue> = Vec::with_capacity(boundaries.len());
    for value in boundaries {
        if values.last() != Some(&value) {
            values.push(value);
        }
    }
    if values.len() == 1 {
        let only = values[0];
        values.push(only);
    }

    let last = values.len().saturating_sub(2);
    values
        .windows(2)
        .enumerate()
        .map(|(idx, pair)| column_range(column, pair[0], pair[1], idx == last))
        .collect()
}

/// AND-only predicates whose union is exactly the lexicographic interval.
pub fn partition_interval(
    columns: &[String],
    interval: &SliceInterval,
) -> Result<Vec<Predicate>, PlanError> {
    if columns.is_empty() {
        return Err(PlanError::EmptyKey);
    }
    check_arity(columns.len(), interval.low.len())?;
    check_arity(columns.len(), interval.high.len())?;
    Ok(interval_segments(
        columns,
        &interval.low,
        &interval.high,
        interval.is_last,
    ))
}

fn check_arity(expected: usize, actual: usize) -> Result<(), PlanError> {
    if expected != actual {
        return Err(PlanError::ArityMismatch { expected, actual });
    }
    Ok(())
}

fn interval_segments(
    columns: &[String],
    low: &[KeyValue],
    high: &[KeyValue],
    is_last: bool,
) -> Vec<Predicate> {
    let (head, tail) = (&columns[0], &columns[1..]);
    if tail.is_empty() {
        return vec![column_range(head, &low[0], &high[0], is_last)];
    }

    if low[0] == high[0] {
        let fixed = eq(head, &low[0]);
        return interval_segments(tail, &low[1..], &high[1..], is_last)
            .into_iter()
            .map(|pred| pred.prefixed(fixed.clone()))
            .collect();
    }

    let mut out = Vec::with_capacity(2 * tail.len() + 1);

    let lower = eq(head, &low[0]);
    out.extend(
        at_least(tail, &low[1..])
            .into_iter()
            .map(|pred| pred.prefixed(lower.clone())),
    );

    out.push(Predicate::new(vec![
        Comparison::new(head.as_str(), CompareOp::Gt, low[0].clone()),
        Comparison::new(head.as_str(), CompareOp::Lt, high[0].clone()),
    ]));

    let upper = eq(head, &high[0]);
    out.extend(
        at_most(tail, &high[1..], is_last)
            .into_iter()
            .map(|pred| pred.prefixed(upper.clone())),
    );

    out
}

/// Disjoint segments covering `columns >= bounds` lexicographically.
fn at_least(columns: &[String], bounds: &[KeyValue]) -> Vec<Predicate> {
    let (head, tail) = (&columns[0], &columns[1..]);
    if tail.is_empty() {
        return vec![Predicate::new(vec![Comparison::new(
            head.as_str(),
            CompareOp::GtEq,
            bounds[0].clone(),
        )])];
    }
    let fixed = eq(head, &bounds[0]);
    let mut out = at_least(tail, &bounds[1..])
        .into_iter()
        .map(|pred| pred.prefixed(fixed.clone()))
        .collect::<Vec<_>>();
    out.push(Predicate::new(vec![Comparison::new(
        head.as_str(),
        CompareOp::Gt,
        bounds[0].clone(),
    )]));
    out
}

/// Disjoint segments covering `columns < bounds` (or `<=` when `inclusive`).
fn at_most(columns: &[String], bounds: &[KeyValue], inclusive: bool) -> Vec<Predicate> {
    let (head, tail) = (&columns[0], &columns[1..]);
    if tail.is_empty() {
        let op = if inclusive {
            CompareOp::LtEq
        } else {
            CompareOp::Lt
        };
        return vec![Predicate::new(vec![Comparison::new(
            head.as_str(),
            op,
            bounds[0].clone(),
        )])];
    }
    let fixed = eq(head, &bounds[0]);
    let mut out = vec![Predicate::new(vec![Comparison::new(
        head.as_str(),
        CompareOp::Lt,
        bounds[0].clone(),
    )])];
    out.extend(
        at_most(tail, &bounds[1..], inclusive)
            .into_iter()
            .map(|pred| pred.prefixed(fixed.clone())),
    );
    out
}

fn column_range(column: &str, low: &KeyValue, high: &KeyValue, closed: bool) -> Predicate {
    let upper = if closed {
        CompareOp::LtEq
    } else {
        CompareOp::Lt
    };
    Predicate::new(vec![
        Comparison::new(column, CompareOp::GtEq, low.clone()),
        Comparison::new(column, upper, high.clone()),
    ])
}

fn eq(column: &str, value: &KeyValue) -> Comparison {
    Comparison::new(column, CompareOp::Eq, value.clone())
}

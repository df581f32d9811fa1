//! End-to-end slicing run: catalog lookup, sampling, planning, SQL text.

use std::time::{Duration, Instant};

use pkslice_plan::{format_literal, plan_predicates, BoundaryList, KeySchema, Predicate};
use serde::Serialize;
use tracing::info;

use crate::error::SliceError;
use crate::metrics::SliceMetrics;
use crate::sampler::BoundarySampler;
use crate::source::KeySource;
use crate::table::TableName;

/// Wall-clock time spent in each phase of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    pub catalog: Duration,
    /// Count plus rank-sample queries.
    pub sampling: Duration,
    pub total: Duration,
}

/// Result of one slicing run.
#[derive(Debug, Clone)]
pub struct SliceRun {
    pub table: TableName,
    pub key: KeySchema,
    pub boundaries: BoundaryList,
    pub predicates: Vec<Predicate>,
    /// `SELECT * FROM <table> WHERE <predicate>;`, one per predicate, in
    /// boundary order.
    pub statements: Vec<String>,
    pub timings: PhaseTimings,
}

/// JSON shape printed by `--format json`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SliceReport {
    pub table: String,
    pub key_columns: Vec<String>,
    /// Boundary tuples with each value rendered as a SQL literal.
    pub boundaries: Vec<Vec<String>>,
    pub statements: Vec<String>,
}

impl SliceRun {
    /// `[profile] pk_cols=[..], fetch=..s, total=..s, boundaries=N, sqls=M`
    pub fn profile_line(&self) -> String {
        format!(
            "[profile] pk_cols={}, fetch={:.3}s, total={:.3}s, boundaries={}, sqls={}",
            self.key,
            self.timings.sampling.as_secs_f64(),
            self.timings.total.as_secs_f64(),
            self.boundaries.len(),
            self.statements.len(),
        )
    }

    pub fn report(&self) -> SliceReport {
        SliceReport {
            table: self.table.qualified(),
            key_columns: self.key.columns().to_vec(),
            boundaries: self
                .boundaries
                .tuples()
                .iter()
                .map(|tuple| tuple.iter().map(format_literal).collect())
                .collect(),
            statements: self.statements.clone(),
        }
    }
}

/// Wraps a predicate into a full scan statement over `table`.
pub fn slice_statement(table: &TableName, predicate: &Predicate) -> String {
    format!("SELECT * FROM {} WHERE {predicate};", table.qualified())
}

/// Produces the slice statements for `table`.
///
/// Fails with [`SliceError::PrimaryKeyNotFound`] when the catalog reports no
/// primary key. An empty table yields an empty statement list.
pub async fn generate_slice_sql(
    source: &dyn KeySource,
    table: &TableName,
    slices: u32,
    metrics: &SliceMetrics,
) -> Result<SliceRun, SliceError> {
    let started = Instant::now();

    let columns = source.primary_key_columns(table).await?;
    let catalog = started.elapsed();
    metrics.record_catalog_lookup(catalog);
    if columns.is_empty() {
        return Err(SliceError::PrimaryKeyNotFound(table.qualified()));
    }
    let dialect = source.dialect();
    let key = KeySchema::new(columns.iter().map(|c| dialect.quote_identifier(c)))?;

    let sampling_started = Instant::now();
    let boundaries = BoundarySampler::new(source, metrics)
        .sample(table, &key, slices)
        .await?;
    let sampling = sampling_started.elapsed();
    info!(pk_cols = %key, boundaries = boundaries.len(), "boundaries fetched");

    let predicates = plan_predicates(&key, &boundaries)?;
    let statements = predicates
        .iter()
        .map(|predicate| slice_statement(table, predicate))
        .collect::<Vec<_>>();
    info!(sqls = statements.len(), "slice statements generated");
    metrics.record_run(statements.len() as u64);

    Ok(SliceRun {
        table: table.clone(),
        key,
        boundaries,
        predicates,
        statements,
        timings: PhaseTimings {
            catalog,
            sampling,
            total: started.elapsed(),
        },
    })
}

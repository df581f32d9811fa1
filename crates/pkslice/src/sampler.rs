//! Boundary sampling: one `COUNT(*)` plus one rank-filtered window query.
//!
//! This mirrors how split keys are picked for a range (sample evenly spaced
//! keys in key order), except the sampling runs inside the database so only
//! the boundary rows cross the wire.

use std::time::Instant;

use pkslice_plan::{sample_stride, target_ranks, BoundaryList, KeySchema, PlanError};
use tracing::debug;

use crate::error::SliceError;
use crate::metrics::SliceMetrics;
use crate::source::KeySource;
use crate::table::TableName;

/// Picks K+1 approximately equal-stride boundary keys from a table.
pub struct BoundarySampler<'a> {
    source: &'a dyn KeySource,
    metrics: &'a SliceMetrics,
}

impl<'a> BoundarySampler<'a> {
    pub fn new(source: &'a dyn KeySource, metrics: &'a SliceMetrics) -> Self {
        Self { source, metrics }
    }

    /// Samples boundaries for `slices` slices.
    ///
    /// Inputs:
    /// - `schema`: primary-key columns in key order.
    /// - `slices`: desired slice count, at least 1.
    ///
    /// Output:
    /// - Empty list when the table has no rows, otherwise a strictly increasing
    ///   list of at least two tuples whose last entry is the maximum key.
    pub async fn sample(
        &self,
        table: &TableName,
        schema: &KeySchema,
        slices: u32,
    ) -> Result<BoundaryList, SliceError> {
        if slices == 0 {
            return Err(SliceError::InvalidSliceCount);
        }
        let started = Instant::now();

        let total = self.source.row_count(table).await?;
        self.metrics.record_count(total);
        if total == 0 {
            debug!(table = %table, "table is empty; no boundaries");
            self.metrics.record_sampling_latency(started.elapsed());
            return Ok(BoundaryList::default());
        }

        let ranks = target_ranks(total, slices);
        debug!(
            table = %table,
            count = total,
            step = sample_stride(total, slices),
            ranks = ?ranks,
            "sampling boundary ranks"
        );

        let rows = self.source.rows_at_ranks(table, schema, &ranks).await?;
        if let Some(row) = rows.iter().find(|row| row.len() != schema.arity()) {
            return Err(PlanError::ArityMismatch {
                expected: schema.arity(),
                actual: row.len(),
            }
            .into());
        }
        let returned = rows.len() as u64;
        let boundaries = BoundaryList::from_sampled(rows);

        self.metrics
            .record_sample(returned, boundaries.len() as u64);
        self.metrics.record_sampling_latency(started.elapsed());
        debug!(
            table = %table,
            sampled = returned,
            boundaries = boundaries.len(),
            "boundaries sampled"
        );
        Ok(boundaries)
    }
}

//! Sample-rank selection and the deduplicated boundary list.

use std::collections::BTreeSet;

use crate::value::KeyTuple;

/// Row ranks (1-based, in key order) to sample for `slices` slices over
/// `total` rows.
///
/// The stride is `max(1, ceil(total / slices))` and the ranks are
/// `1 + i * stride` for `i < slices`, plus `total` itself so the maximum key
/// is always sampled. Ranks past `total` match no row and are dropped.
/// Returns an empty list when `total` or `slices` is zero.
pub fn target_ranks(total: u64, slices: u32) -> Vec<u64> {
    if total == 0 || slices == 0 {
        return Vec::new();
    }
    let step = sample_stride(total, slices);
    let mut ranks = (0..u64::from(slices))
        .map(|i| i.saturating_mul(step).saturating_add(1))
        .filter(|rank| *rank <= total)
        .collect::<BTreeSet<_>>();
    ranks.insert(total);
    ranks.into_iter().collect()
}

/// Stride between sampled ranks: `max(1, ceil(total / slices))`.
pub fn sample_stride(total: u64, slices: u32) -> u64 {
    total.div_ceil(u64::from(slices.max(1))).max(1)
}

/// Half-open key interval `[low, high)`, closed on both ends for the last
/// slice of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceInterval {
    pub low: KeyTuple,
    pub high: KeyTuple,
    pub is_last: bool,
}

/// Strictly increasing boundary tuples produced by one sampling pass.
///
/// Either empty (no rows) or at least two tuples long, so every non-empty
/// list yields at least one closed interval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryList {
    tuples: Vec<KeyTuple>,
}

impl BoundaryList {
    /// Builds the list from rank-ordered sample rows.
    ///
    /// Adjacent equal tuples collapse into one. A single surviving tuple is
    /// duplicated so a one-row (or one-key) table still produces one slice.
    pub fn from_sampled(rows: Vec<KeyTuple>) -> Self {
        let mut tuples: Vec<KeyTuple> = Vec::with_capacity(rows.len());
        for row in rows {
            if tuples.last() != Some(&row) {
                tuples.push(row);
            }
        }
        if let [only] = tuples.as_slice() {
            let duplicate = only.clone();
            tuples.push(duplicate);
        }
        Self { tuples }
    }

    pub fn tuples(&self) -> &[KeyTuple] {
        &self.tuples
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Consecutive intervals; only the final one is marked `is_last`.
    pub fn intervals(&self) -> Vec<SliceInterval> {
        let count = self.tuples.len().saturating_sub(1);
        self.tuples
            .windows(2)
            .enumerate()
            .map(|(idx, pair)| SliceInterval {
                low: pair[0].clone(),
                high: pair[1].clone(),
                is_last: idx + 1 == count,
            })
            .collect()
    }
}

//! In-memory key source shared by integration tests.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use pkslice::{Dialect, KeySource, SliceError, TableName};
use pkslice_plan::{compare_tuples, KeySchema, KeyTuple};

/// Table held in memory; rows are kept sorted in key order.
pub struct MemoryTable {
    pub key_columns: Vec<String>,
    dialect: Dialect,
    rows: Vec<KeyTuple>,
    /// Every rank list passed to `rows_at_ranks`.
    pub rank_requests: Mutex<Vec<Vec<u64>>>,
    /// Key column list of every sampling request, as it would appear in SQL.
    pub sampled_columns: Mutex<Vec<String>>,
}

impl MemoryTable {
    pub fn new(key_columns: &[&str], mut rows: Vec<KeyTuple>) -> Self {
        rows.sort_by(|a, b| compare_tuples(a, b).unwrap_or(Ordering::Equal));
        Self {
            key_columns: key_columns.iter().map(|c| c.to_string()).collect(),
            dialect: Dialect::Postgres,
            rows,
            rank_requests: Mutex::new(Vec::new()),
            sampled_columns: Mutex::new(Vec::new()),
        }
    }

    /// Reports `dialect` to the orchestrator (Postgres by default).
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Table without a primary key.
    pub fn without_key(rows: Vec<KeyTuple>) -> Self {
        Self::new(&[], rows)
    }

    pub fn rows(&self) -> &[KeyTuple] {
        &self.rows
    }

    pub fn requested_ranks(&self) -> Vec<Vec<u64>> {
        self.rank_requests.lock().expect("rank log").clone()
    }

    pub fn sampled_column_lists(&self) -> Vec<String> {
        self.sampled_columns.lock().expect("column log").clone()
    }
}

#[async_trait]
impl KeySource for MemoryTable {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn primary_key_columns(&self, _table: &TableName) -> Result<Vec<String>, SliceError> {
        Ok(self.key_columns.clone())
    }

    async fn row_count(&self, _table: &TableName) -> Result<u64, SliceError> {
        Ok(self.rows.len() as u64)
    }

    async fn rows_at_ranks(
        &self,
        _table: &TableName,
        schema: &KeySchema,
        ranks: &[u64],
    ) -> Result<Vec<KeyTuple>, SliceError> {
        self.rank_requests.lock().expect("rank log").push(ranks.to_vec());
        self.sampled_columns
            .lock()
            .expect("column log")
            .push(schema.column_list());
        Ok(ranks
            .iter()
            .filter_map(|rank| {
                let idx = usize::try_from(*rank).ok()?.checked_sub(1)?;
                self.rows.get(idx).cloned()
            })
            .collect())
    }
}

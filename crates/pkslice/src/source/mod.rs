//! Database handles that can answer the three questions slicing needs:
//! which columns form the primary key, how many rows there are, and which
//! keys sit at given ranks.

use async_trait::async_trait;
use pkslice_plan::{KeySchema, KeyTuple};

use crate::dialect::Dialect;
use crate::error::SliceError;
use crate::table::TableName;

#[cfg(feature = "oracle")]
pub mod oracle;
pub mod postgres;

#[cfg(feature = "oracle")]
pub use self::oracle::OracleSource;
pub use self::postgres::PostgresSource;

/// Open, query-capable connection used by one slicing run.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Dialect used to quote the key columns embedded in generated SQL.
    fn dialect(&self) -> Dialect;

    /// Primary-key column names in key order; empty when the table has none.
    async fn primary_key_columns(&self, table: &TableName) -> Result<Vec<String>, SliceError>;

    /// `SELECT COUNT(*)` over the table.
    async fn row_count(&self, table: &TableName) -> Result<u64, SliceError>;

    /// Key tuples of the rows at the given 1-based ranks in key order,
    /// returned in ascending rank order. Ranks with no row are skipped.
    async fn rows_at_ranks(
        &self,
        table: &TableName,
        schema: &KeySchema,
        ranks: &[u64],
    ) -> Result<Vec<KeyTuple>, SliceError>;
}

/// Opens a key source for `dialect` using a driver-specific connect string.
pub async fn connect(dialect: Dialect, conn: &str) -> Result<Box<dyn KeySource>, SliceError> {
    match dialect {
        Dialect::Postgres => Ok(Box::new(PostgresSource::connect(conn).await?)),
        #[cfg(feature = "oracle")]
        Dialect::Oracle => Ok(Box::new(OracleSource::connect(conn).await?)),
        #[cfg(not(feature = "oracle"))]
        Dialect::Oracle => Err(SliceError::DriverUnavailable(Dialect::Oracle)),
    }
}

/// Converts sampled ranks to the signed form both drivers bind.
pub(crate) fn ranks_as_i64(ranks: &[u64]) -> Vec<i64> {
    ranks
        .iter()
        .map(|rank| i64::try_from(*rank).unwrap_or(i64::MAX))
        .collect()
}

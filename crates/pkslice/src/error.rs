use pkslice_plan::PlanError;
use thiserror::Error;

use crate::dialect::Dialect;

/// Failure of one slicing run. Runs are all-or-nothing: no partial output is
/// produced once any of these is returned.
#[derive(Debug, Error)]
pub enum SliceError {
    #[error("unsupported dialect '{0}' (expected pg or ora)")]
    UnsupportedDialect(String),
    #[error("{0} driver is not available in this build")]
    DriverUnavailable(Dialect),
    #[error("invalid connect string: {0}")]
    InvalidConnectString(String),
    #[error("slice count must be at least 1")]
    InvalidSliceCount,
    #[error("key column '{column}' has unsupported type {type_name}")]
    UnsupportedKeyType { column: String, type_name: String },
    #[error("primary key not found for table {0}")]
    PrimaryKeyNotFound(String),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Postgres(#[from] tokio_postgres::Error),
    #[cfg(feature = "oracle")]
    #[error(transparent)]
    Oracle(#[from] oracle::Error),
    #[error("blocking database task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl SliceError {
    /// Setup problems detected before any data is read.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedDialect(_)
                | Self::DriverUnavailable(_)
                | Self::InvalidConnectString(_)
                | Self::InvalidSliceCount
                | Self::UnsupportedKeyType { .. }
        )
    }

    /// The table cannot be sliced because it has no usable primary key.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::PrimaryKeyNotFound(_) | Self::Plan(PlanError::EmptyKey))
    }
}

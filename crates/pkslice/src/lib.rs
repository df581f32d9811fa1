//! Primary-key slicing against live databases.
//!
//! Looks up a table's primary key, samples boundary keys in key order and
//! turns the intervals between them into AND-only `SELECT` statements that
//! together scan every row exactly once. Planning itself lives in
//! `pkslice_plan`; this crate adds dialect SQL, database sources and the CLI
//! plumbing.

pub mod config;
pub mod dialect;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod sampler;
pub mod source;
pub mod table;

pub use config::{OutputFormat, SliceConfig};
pub use dialect::{CatalogQuery, Dialect};
pub use error::SliceError;
pub use metrics::{SliceMetrics, SliceMetricsSnapshot};
pub use orchestrator::{generate_slice_sql, slice_statement, PhaseTimings, SliceReport, SliceRun};
pub use sampler::BoundarySampler;
pub use source::{connect, KeySource};
pub use table::TableName;

//! Pure planning layer for primary-key slicing.
//!
//! Given a key schema and sampled boundary tuples, this crate produces
//! AND-only predicates that partition the key space into disjoint, fully
//! covering slices. Nothing here performs I/O; sampling lives in `pkslice`.

pub mod boundary;
pub mod error;
pub mod literal;
pub mod partition;
pub mod predicate;
pub mod value;

pub use boundary::{sample_stride, target_ranks, BoundaryList, SliceInterval};
pub use error::PlanError;
pub use literal::{format_literal, Literal};
pub use partition::{partition_interval, partition_single, plan_predicates};
pub use predicate::{CompareOp, Comparison, Predicate};
pub use value::{compare_tuples, KeySchema, KeyTuple, KeyValue};

//! Typed primary-key values, tuples, and the ordered key schema.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::error::PlanError;

/// One primary-key column value as read back from the database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    /// SQL `NULL`.
    Null,
    /// Exact integer (`SMALLINT`, `INTEGER`, `BIGINT`, integral `NUMBER`).
    Integer(i64),
    /// Exact decimal (`NUMERIC`, fractional `NUMBER`, floating columns).
    Decimal(Decimal),
    /// Character data.
    Text(String),
    /// Date-only value.
    Date(NaiveDate),
    /// Date and time of day without zone.
    Timestamp(NaiveDateTime),
    /// Absolute instant (`TIMESTAMPTZ`), normalized to UTC.
    TimestampTz(DateTime<Utc>),
}

impl KeyValue {
    /// Returns `true` for SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
            Self::TimestampTz(_) => "timestamptz",
        }
    }

    /// Compares two values the way a SQL engine compares a column to a literal.
    ///
    /// Integers and decimals compare numerically, dates compare against
    /// timestamps as midnight. Zoned instants only compare with each other.
    /// Anything involving `NULL`, or two unrelated kinds, has no ordering.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(l), Self::Integer(r)) => Some(l.cmp(r)),
            (Self::Decimal(l), Self::Decimal(r)) => Some(l.cmp(r)),
            (Self::Integer(l), Self::Decimal(r)) => Some(Decimal::from(*l).cmp(r)),
            (Self::Decimal(l), Self::Integer(r)) => Some(l.cmp(&Decimal::from(*r))),
            (Self::Text(l), Self::Text(r)) => Some(l.cmp(r)),
            (Self::Date(l), Self::Date(r)) => Some(l.cmp(r)),
            (Self::Timestamp(l), Self::Timestamp(r)) => Some(l.cmp(r)),
            (Self::TimestampTz(l), Self::TimestampTz(r)) => Some(l.cmp(r)),
            (Self::Date(l), Self::Timestamp(r)) => Some(l.and_time(NaiveTime::MIN).cmp(r)),
            (Self::Timestamp(l), Self::Date(r)) => Some(l.cmp(&r.and_time(NaiveTime::MIN))),
            _ => None,
        }
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for KeyValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<Decimal> for KeyValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for KeyValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for KeyValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for KeyValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::TimestampTz(value)
    }
}

impl<T: Into<KeyValue>> From<Option<T>> for KeyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered values of one primary-key row, in key-column order.
pub type KeyTuple = Vec<KeyValue>;

/// Compares two key tuples component-wise, left to right.
///
/// Returns `None` as soon as one component pair has no ordering.
pub fn compare_tuples(left: &[KeyValue], right: &[KeyValue]) -> Option<Ordering> {
    for (l, r) in left.iter().zip(right) {
        match l.compare(r)? {
            Ordering::Equal => continue,
            other => return Some(other),
        }
    }
    Some(left.len().cmp(&right.len()))
}

/// Ordered primary-key column names. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    columns: Vec<String>,
}

impl KeySchema {
    /// Builds a schema from catalog order; an empty column list is rejected.
    pub fn new<I, S>(columns: I) -> Result<Self, PlanError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect::<Vec<_>>();
        if columns.is_empty() {
            return Err(PlanError::EmptyKey);
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    /// Position of `column` in the key, if present.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Comma-separated column list, as used in projections and `ORDER BY`.
    pub fn column_list(&self) -> String {
        self.columns.join(", ")
    }
}

impl fmt::Display for KeySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.columns.join(", "))
    }
}

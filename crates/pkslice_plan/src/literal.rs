//! SQL literal rendering for key values.
//!
//! Literals use ANSI typed-literal syntax, which both PostgreSQL and Oracle
//! accept in embedded SQL text. Zoned instants use PostgreSQL's
//! `TIMESTAMP WITH TIME ZONE '...'` form.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::value::KeyValue;

/// Renders `value` as an embedded SQL literal.
pub fn format_literal(value: &KeyValue) -> String {
    Literal(value).to_string()
}

/// `Display` adapter that writes a [`KeyValue`] as a SQL literal.
#[derive(Debug, Clone, Copy)]
pub struct Literal<'a>(pub &'a KeyValue);

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            KeyValue::Null => f.write_str("NULL"),
            KeyValue::Integer(v) => write!(f, "{v}"),
            KeyValue::Decimal(v) => write!(f, "{v}"),
            KeyValue::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            KeyValue::Date(v) => write!(f, "DATE '{}'", v.format("%Y-%m-%d")),
            KeyValue::Timestamp(v) => write_timestamp(f, v),
            KeyValue::TimestampTz(v) => write_timestamptz(f, v),
        }
    }
}

/// Midnight renders as a `DATE` literal. Sub-second digits are kept so the
/// closed upper bound of the last slice still reaches the maximum key.
fn write_timestamp(f: &mut fmt::Formatter<'_>, value: &NaiveDateTime) -> fmt::Result {
    if value.time() == NaiveTime::MIN {
        return write!(f, "DATE '{}'", value.format("%Y-%m-%d"));
    }
    write!(f, "TIMESTAMP '{}'", wall_clock(value))
}

/// Zoned instants carry an explicit `+00` offset so the session `TimeZone`
/// does not shift them.
fn write_timestamptz(f: &mut fmt::Formatter<'_>, value: &DateTime<Utc>) -> fmt::Result {
    write!(
        f,
        "TIMESTAMP WITH TIME ZONE '{}+00'",
        wall_clock(&value.naive_utc())
    )
}

/// `YYYY-MM-DD HH:MM:SS[.fraction]`, trailing fraction zeros trimmed.
fn wall_clock(value: &NaiveDateTime) -> String {
    let seconds = value.format("%Y-%m-%d %H:%M:%S").to_string();
    let nanos = value.nanosecond() % 1_000_000_000;
    if nanos == 0 {
        return seconds;
    }
    let fraction = format!("{nanos:09}");
    format!("{seconds}.{}", fraction.trim_end_matches('0'))
}

//! Validated run configuration built from command-line arguments.

use clap::ValueEnum;

use crate::dialect::Dialect;
use crate::error::SliceError;
use crate::table::TableName;

/// How statements are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One statement per line.
    #[default]
    Text,
    /// A single JSON document with key columns, boundaries and statements.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceConfig {
    pub dialect: Dialect,
    /// Driver connect string (libpq style for pg, `user/password@db` for ora).
    pub conn: String,
    pub table: TableName,
    pub slices: u32,
    /// Print phase timings to stderr after the run.
    pub profile: bool,
    pub format: OutputFormat,
}

impl SliceConfig {
    pub fn new(
        dialect: Dialect,
        conn: impl Into<String>,
        table: &str,
        slices: u32,
    ) -> Result<Self, SliceError> {
        let config = Self {
            dialect,
            conn: conn.into(),
            table: TableName::parse(table),
            slices,
            profile: false,
            format: OutputFormat::Text,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn validate(&self) -> Result<(), SliceError> {
        if self.slices == 0 {
            return Err(SliceError::InvalidSliceCount);
        }
        if self.conn.trim().is_empty() {
            return Err(SliceError::InvalidConnectString(
                "connect string is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_slices() {
        let err = SliceConfig::new(Dialect::Postgres, "host=localhost", "t", 0)
            .expect_err("zero slices");
        assert!(matches!(err, SliceError::InvalidSliceCount));
    }

    #[test]
    fn rejects_blank_connect_string() {
        let err = SliceConfig::new(Dialect::Oracle, "  ", "t", 4).expect_err("blank conn");
        assert!(err.is_configuration());
    }

    #[test]
    fn parses_schema_qualified_table() {
        let config = SliceConfig::new(Dialect::Postgres, "host=localhost", "sales.orders", 8)
            .expect("config")
            .with_format(OutputFormat::Json);
        assert_eq!(config.table.schema.as_deref(), Some("sales"));
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.profile);
    }
}

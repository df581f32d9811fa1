//! SQL dialects supported for catalog lookup and boundary sampling.
//!
//! The dialect is picked once from configuration; everything downstream asks
//! it for SQL text instead of branching on driver names.

use std::fmt;
use std::str::FromStr;

use pkslice_plan::KeySchema;

use crate::error::SliceError;
use crate::table::TableName;

/// Database flavor of the connection being sliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    Oracle,
}

/// Catalog query returning primary-key column names in key order, one per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub sql: &'static str,
    pub params: Vec<String>,
}

const PG_PRIMARY_KEY_SQL: &str = "SELECT a.attname::text \
     FROM pg_constraint c \
     CROSS JOIN LATERAL unnest(c.conkey) WITH ORDINALITY AS k(attnum, ord) \
     JOIN pg_attribute a ON a.attrelid = c.conrelid AND a.attnum = k.attnum \
     WHERE c.conrelid = $1::text::regclass AND c.contype = 'p' \
     ORDER BY k.ord";

const ORA_OWNED_PRIMARY_KEY_SQL: &str = "SELECT acc.column_name \
     FROM all_constraints ac \
     JOIN all_cons_columns acc \
       ON ac.owner = acc.owner AND ac.constraint_name = acc.constraint_name \
     WHERE ac.owner = :1 AND ac.table_name = :2 AND ac.constraint_type = 'P' \
     ORDER BY acc.position";

const ORA_USER_PRIMARY_KEY_SQL: &str = "SELECT acc.column_name \
     FROM user_constraints ac \
     JOIN user_cons_columns acc ON ac.constraint_name = acc.constraint_name \
     WHERE ac.table_name = :1 AND ac.constraint_type = 'P' \
     ORDER BY acc.position";

/// Reserved words that show up as column names and must be quoted.
const RESERVED_WORDS: &[&str] = &[
    "all", "and", "as", "by", "check", "column", "date", "default", "desc", "from", "group",
    "level", "limit", "number", "offset", "or", "order", "select", "size", "table", "to", "user",
    "where",
];

impl Dialect {
    /// Short name accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "pg",
            Self::Oracle => "ora",
        }
    }

    /// Bind placeholder for the 1-based parameter `index`.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${index}"),
            Self::Oracle => format!(":{index}"),
        }
    }

    /// Renders a catalog column name so it resolves to the same column when
    /// embedded in SQL text.
    ///
    /// Names already in the dialect's folded case (lower for Postgres, upper
    /// for Oracle) stay bare; anything else is double-quoted.
    pub fn quote_identifier(self, name: &str) -> String {
        let folded = match self {
            Self::Postgres => is_plain_identifier(name, |c| c.is_ascii_lowercase()),
            Self::Oracle => is_plain_identifier(name, |c| c.is_ascii_uppercase()),
        };
        if folded && !RESERVED_WORDS.contains(&name.to_ascii_lowercase().as_str()) {
            name.to_string()
        } else {
            format!("\"{}\"", name.replace('"', "\"\""))
        }
    }

    pub fn count_sql(self, table: &TableName) -> String {
        format!("SELECT COUNT(*) FROM {}", table.qualified())
    }

    /// Selects key columns of the rows whose `ROW_NUMBER()` in key order is one
    /// of `rank_count` bound ranks, returned in rank order.
    pub fn rank_sample_sql(self, table: &TableName, schema: &KeySchema, rank_count: usize) -> String {
        let columns = schema.column_list();
        let placeholders = (1..=rank_count)
            .map(|idx| self.placeholder(idx))
            .collect::<Vec<_>>()
            .join(",");
        let alias = match self {
            Self::Postgres => " t",
            Self::Oracle => "",
        };
        format!(
            "SELECT {columns} FROM ( \
             SELECT {columns}, ROW_NUMBER() OVER (ORDER BY {columns}) rn FROM {table} \
             ){alias} WHERE rn IN ({placeholders}) ORDER BY rn",
            table = table.qualified(),
        )
    }

    pub fn primary_key_query(self, table: &TableName) -> CatalogQuery {
        match (self, &table.schema) {
            (Self::Postgres, _) => CatalogQuery {
                sql: PG_PRIMARY_KEY_SQL,
                params: vec![table.qualified()],
            },
            // Oracle stores unquoted identifiers upper-cased.
            (Self::Oracle, Some(schema)) => CatalogQuery {
                sql: ORA_OWNED_PRIMARY_KEY_SQL,
                params: vec![schema.to_uppercase(), table.name.to_uppercase()],
            },
            (Self::Oracle, None) => CatalogQuery {
                sql: ORA_USER_PRIMARY_KEY_SQL,
                params: vec![table.name.to_uppercase()],
            },
        }
    }
}

fn is_plain_identifier(name: &str, is_letter: impl Fn(char) -> bool) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (is_letter(first) || first == '_')
        && chars.all(|c| is_letter(c) || c.is_ascii_digit() || c == '_' || c == '$')
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = SliceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pg" | "postgres" | "postgresql" => Ok(Self::Postgres),
            "ora" | "oracle" => Ok(Self::Oracle),
            _ => Err(SliceError::UnsupportedDialect(raw.to_string())),
        }
    }
}

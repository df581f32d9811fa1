//! Oracle key source over the blocking `oracle` driver.
//!
//! Every driver call runs on the blocking pool; the connection sits behind a
//! mutex so the source stays `Send + Sync`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use oracle::sql_type::{OracleType, ToSql};
use oracle::{Connection, Row};
use pkslice_plan::{KeySchema, KeyTuple, KeyValue};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::debug;

use super::{ranks_as_i64, KeySource};
use crate::dialect::Dialect;
use crate::error::SliceError;
use crate::table::TableName;

pub struct OracleSource {
    conn: Arc<Mutex<Connection>>,
}

impl OracleSource {
    /// Connects with `user/password@connect_identifier`.
    pub async fn connect(conn: &str) -> Result<Self, SliceError> {
        let (user, password, database) = parse_connect_string(conn)?;
        let conn = tokio::task::spawn_blocking(move || {
            Connection::connect(&user, &password, &database)
        })
        .await??;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, work: F) -> Result<T, SliceError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, SliceError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.blocking_lock();
            work(&guard)
        })
        .await?
    }
}

#[async_trait]
impl KeySource for OracleSource {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    async fn primary_key_columns(&self, table: &TableName) -> Result<Vec<String>, SliceError> {
        let query = Dialect::Oracle.primary_key_query(table);
        debug!(table = %table, "fetching primary key (ora)");
        self.with_conn(move |conn| {
            let params = query
                .params
                .iter()
                .map(|p| p as &dyn ToSql)
                .collect::<Vec<_>>();
            let rows = conn.query(query.sql, &params)?;
            let mut columns = Vec::new();
            for row in rows {
                columns.push(row?.get::<usize, String>(0)?);
            }
            Ok(columns)
        })
        .await
    }

    async fn row_count(&self, table: &TableName) -> Result<u64, SliceError> {
        let sql = Dialect::Oracle.count_sql(table);
        self.with_conn(move |conn| {
            let row = conn.query_row(&sql, &[])?;
            let total = row.get::<usize, i64>(0)?;
            Ok(u64::try_from(total).unwrap_or(0))
        })
        .await
    }

    async fn rows_at_ranks(
        &self,
        table: &TableName,
        schema: &KeySchema,
        ranks: &[u64],
    ) -> Result<Vec<KeyTuple>, SliceError> {
        if ranks.is_empty() {
            return Ok(Vec::new());
        }
        let sql = Dialect::Oracle.rank_sample_sql(table, schema, ranks.len());
        debug!(sql = %sql, "boundary sql (ora)");
        let ranks = ranks_as_i64(ranks);
        let schema = schema.clone();
        self.with_conn(move |conn| {
            let params = ranks.iter().map(|r| r as &dyn ToSql).collect::<Vec<_>>();
            let rows = conn.query(&sql, &params)?;
            let mut tuples = Vec::with_capacity(ranks.len());
            for row in rows {
                tuples.push(decode_key_row(&row?, &schema)?);
            }
            Ok(tuples)
        })
        .await
    }
}

fn parse_connect_string(raw: &str) -> Result<(String, String, String), SliceError> {
    let invalid = || {
        SliceError::InvalidConnectString("expected user/password@connect_identifier".to_string())
    };
    let (credentials, database) = raw.rsplit_once('@').ok_or_else(invalid)?;
    let (user, password) = credentials.split_once('/').ok_or_else(invalid)?;
    if user.is_empty() || database.is_empty() {
        return Err(invalid());
    }
    Ok((user.to_string(), password.to_string(), database.to_string()))
}

fn decode_key_row(row: &Row, schema: &KeySchema) -> Result<KeyTuple, SliceError> {
    let info = row.column_info();
    schema
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let ty = info
                .get(idx)
                .map(|c| c.oracle_type().clone())
                .ok_or_else(|| SliceError::UnsupportedKeyType {
                    column: column.clone(),
                    type_name: "missing column".to_string(),
                })?;
            decode_key_value(row, idx, column, &ty)
        })
        .collect()
}

fn decode_key_value(
    row: &Row,
    idx: usize,
    column: &str,
    ty: &OracleType,
) -> Result<KeyValue, SliceError> {
    let value = match ty {
        OracleType::Number(_, _) | OracleType::Float(_) | OracleType::Int64 => {
            match row.get::<usize, Option<String>>(idx)? {
                None => KeyValue::Null,
                Some(text) => parse_number(column, text.trim())?,
            }
        }
        OracleType::Varchar2(_)
        | OracleType::NVarchar2(_)
        | OracleType::Char(_)
        | OracleType::NChar(_) => KeyValue::from(row.get::<usize, Option<String>>(idx)?),
        OracleType::Date | OracleType::Timestamp(_) => {
            KeyValue::from(row.get::<usize, Option<NaiveDateTime>>(idx)?)
        }
        other => {
            return Err(SliceError::UnsupportedKeyType {
                column: column.to_string(),
                type_name: other.to_string(),
            })
        }
    };
    Ok(value)
}

/// NUMBER arrives as text; integral values stay integers.
fn parse_number(column: &str, text: &str) -> Result<KeyValue, SliceError> {
    if let Ok(int) = text.parse::<i64>() {
        return Ok(KeyValue::Integer(int));
    }
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(text))
        .map(KeyValue::Decimal)
        .map_err(|_| SliceError::UnsupportedKeyType {
            column: column.to_string(),
            type_name: format!("NUMBER ({text})"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_string_splits_user_password_and_database() {
        let (user, password, db) =
            parse_connect_string("scott/ti@ger@//host:1521/ORCL").expect("parse");
        assert_eq!(user, "scott");
        assert_eq!(password, "ti@ger");
        assert_eq!(db, "//host:1521/ORCL");
    }

    #[test]
    fn connect_string_without_database_is_rejected() {
        let err = parse_connect_string("scott/tiger").expect_err("missing @");
        assert!(err.is_configuration());
    }

    #[test]
    fn numbers_prefer_integers() {
        assert_eq!(parse_number("id", "42").expect("int"), KeyValue::Integer(42));
        assert_eq!(
            parse_number("amt", "12.50").expect("dec"),
            KeyValue::Decimal(Decimal::new(1250, 2))
        );
    }
}

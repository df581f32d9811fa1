//! PostgreSQL key source over `tokio-postgres`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pkslice_plan::{KeySchema, KeyTuple, KeyValue};
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ranks_as_i64, KeySource};
use crate::dialect::Dialect;
use crate::error::SliceError;
use crate::table::TableName;

/// Key source backed by one PostgreSQL connection.
pub struct PostgresSource {
    client: Client,
    /// Drives the connection; aborted when the source is dropped.
    driver: JoinHandle<()>,
}

impl PostgresSource {
    /// Connects with a libpq-style connection string.
    pub async fn connect(conn: &str) -> Result<Self, SliceError> {
        let (client, connection) = tokio_postgres::connect(conn, NoTls).await?;
        let driver = tokio::spawn(async move {
            if let Err(err) = connection.await {
                warn!(error = %err, "postgres connection closed with error");
            }
        });
        Ok(Self { client, driver })
    }
}

impl Drop for PostgresSource {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[async_trait]
impl KeySource for PostgresSource {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn primary_key_columns(&self, table: &TableName) -> Result<Vec<String>, SliceError> {
        let query = Dialect::Postgres.primary_key_query(table);
        debug!(table = %table, "fetching primary key (pg)");
        let params = query
            .params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect::<Vec<_>>();
        let rows = self.client.query(query.sql, &params).await?;
        rows.iter()
            .map(|row| row.try_get::<_, String>(0).map_err(SliceError::from))
            .collect()
    }

    async fn row_count(&self, table: &TableName) -> Result<u64, SliceError> {
        let sql = Dialect::Postgres.count_sql(table);
        let row = self.client.query_one(sql.as_str(), &[]).await?;
        let total: i64 = row.try_get(0)?;
        Ok(u64::try_from(total).unwrap_or(0))
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
        let sql = Dialect::Postgres.rank_sample_sql(table, schema, ranks.len());
        debug!(sql = %sql, "boundary sql (pg)");
        let ranks = ranks_as_i64(ranks);
        let params = ranks
            .iter()
            .map(|rank| rank as &(dyn ToSql + Sync))
            .collect::<Vec<_>>();
        let rows = self.client.query(sql.as_str(), &params).await?;
        rows.iter().map(|row| decode_key_row(row, schema)).collect()
    }
}

fn decode_key_row(row: &Row, schema: &KeySchema) -> Result<KeyTuple, SliceError> {
    schema
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| decode_key_value(row, idx, column))
        .collect()
}

fn decode_key_value(row: &Row, idx: usize, column: &str) -> Result<KeyValue, SliceError> {
    let ty = row.columns()[idx].type_();
    // `Type` is not usable in match patterns; compare explicitly.
    let value = if *ty == Type::INT2 {
        KeyValue::from(row.try_get::<_, Option<i16>>(idx)?.map(i64::from))
    } else if *ty == Type::INT4 {
        KeyValue::from(row.try_get::<_, Option<i32>>(idx)?.map(i64::from))
    } else if *ty == Type::INT8 {
        KeyValue::from(row.try_get::<_, Option<i64>>(idx)?)
    } else if *ty == Type::NUMERIC {
        KeyValue::from(row.try_get::<_, Option<Decimal>>(idx)?)
    } else if *ty == Type::FLOAT4 || *ty == Type::FLOAT8 {
        let raw = if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(idx)?.map(f64::from)
        } else {
            row.try_get::<_, Option<f64>>(idx)?
        };
        match raw {
            None => KeyValue::Null,
            Some(v) => KeyValue::Decimal(Decimal::from_f64_retain(v).ok_or_else(|| {
                SliceError::UnsupportedKeyType {
                    column: column.to_string(),
                    type_name: format!("{ty} (non-finite value)"),
                }
            })?),
        }
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        KeyValue::from(row.try_get::<_, Option<String>>(idx)?)
    } else if *ty == Type::DATE {
        KeyValue::from(row.try_get::<_, Option<NaiveDate>>(idx)?)
    } else if *ty == Type::TIMESTAMP {
        KeyValue::from(row.try_get::<_, Option<NaiveDateTime>>(idx)?)
    } else if *ty == Type::TIMESTAMPTZ {
        KeyValue::from(row.try_get::<_, Option<DateTime<Utc>>>(idx)?)
    } else if *ty == Type::UUID {
        // Hyphenated lowercase text sorts like the uuid bytes.
        KeyValue::from(
            row.try_get::<_, Option<Uuid>>(idx)?
                .map(|id| id.hyphenated().to_string()),
        )
    } else {
        return Err(SliceError::UnsupportedKeyType {
            column: column.to_string(),
            type_name: ty.name().to_string(),
        });
    };
    Ok(value)
}

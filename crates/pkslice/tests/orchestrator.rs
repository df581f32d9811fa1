mod common;

use anyhow::Result;
use chrono::NaiveDate;
use common::MemoryTable;
use pkslice::{generate_slice_sql, Dialect, SliceError, SliceMetrics, SliceRun, TableName};
use pkslice_plan::{KeySchema, KeyTuple, KeyValue};

fn ids(range: std::ops::RangeInclusive<i64>) -> Vec<KeyTuple> {
    range.map(|id| vec![KeyValue::Integer(id)]).collect()
}

/// Oracle-style catalog: unquoted names come back upper-cased.
fn upper_case_table(key_columns: &[&str], rows: Vec<KeyTuple>) -> MemoryTable {
    MemoryTable::new(key_columns, rows).with_dialect(Dialect::Oracle)
}

fn date(d: u32) -> KeyValue {
    KeyValue::Date(NaiveDate::from_ymd_opt(2024, 1, d).expect("valid date"))
}

async fn slice(table: &MemoryTable, name: &str, slices: u32) -> Result<SliceRun, SliceError> {
    let metrics = SliceMetrics::default();
    generate_slice_sql(table, &TableName::parse(name), slices, &metrics).await
}

fn assert_exact_cover(run: &SliceRun, rows: &[KeyTuple]) {
    let schema: &KeySchema = &run.key;
    for row in rows {
        let hits = run
            .predicates
            .iter()
            .filter(|p| p.matches(schema, row))
            .count();
        assert_eq!(hits, 1, "row {row:?} matched {hits} slices");
    }
    for statement in &run.statements {
        assert!(!statement.contains(" OR "), "OR in {statement}");
        assert!(!statement.contains("UNION"), "UNION in {statement}");
    }
}

#[tokio::test]
async fn single_numeric_key_thirty_rows_three_slices() -> Result<()> {
    let table = upper_case_table(&["ID"], ids(1..=30));
    let run = slice(&table, "t", 3).await?;
    assert_eq!(
        run.statements,
        vec![
            "SELECT * FROM t WHERE ID >= 1 AND ID < 11;",
            "SELECT * FROM t WHERE ID >= 11 AND ID < 21;",
            "SELECT * FROM t WHERE ID >= 21 AND ID <= 30;",
        ]
    );
    assert_eq!(table.requested_ranks(), vec![vec![1, 11, 21, 30]]);
    assert_exact_cover(&run, table.rows());
    Ok(())
}

#[tokio::test]
async fn date_and_id_key_mixes_same_date_and_middle_bands() -> Result<()> {
    let rows = (1..=3)
        .flat_map(|d| (1..=10).map(move |id| vec![date(d), KeyValue::Integer(id)]))
        .collect::<Vec<_>>();
    let table = upper_case_table(&["DT", "ID"], rows.clone());
    let run = slice(&table, "sales.t", 4).await?;

    assert_eq!(table.requested_ranks(), vec![vec![1, 9, 17, 25, 30]]);
    assert_eq!(
        run.statements,
        vec![
            "SELECT * FROM sales.t WHERE DT = DATE '2024-01-01' AND ID >= 1 AND ID < 9;",
            "SELECT * FROM sales.t WHERE DT = DATE '2024-01-01' AND ID >= 9;",
            "SELECT * FROM sales.t WHERE DT > DATE '2024-01-01' AND DT < DATE '2024-01-02';",
            "SELECT * FROM sales.t WHERE DT = DATE '2024-01-02' AND ID < 7;",
            "SELECT * FROM sales.t WHERE DT = DATE '2024-01-02' AND ID >= 7;",
            "SELECT * FROM sales.t WHERE DT > DATE '2024-01-02' AND DT < DATE '2024-01-03';",
            "SELECT * FROM sales.t WHERE DT = DATE '2024-01-03' AND ID < 5;",
            "SELECT * FROM sales.t WHERE DT = DATE '2024-01-03' AND ID >= 5 AND ID <= 10;",
        ]
    );
    assert_exact_cover(&run, &rows);
    Ok(())
}

#[tokio::test]
async fn empty_table_yields_no_statements() -> Result<()> {
    let table = upper_case_table(&["ID"], Vec::new());
    let metrics = SliceMetrics::default();
    let run = generate_slice_sql(&table, &TableName::parse("t"), 8, &metrics).await?;
    assert!(run.statements.is_empty());
    assert!(run.boundaries.is_empty());
    assert!(table.requested_ranks().is_empty());
    let snap = metrics.snapshot();
    assert_eq!(snap.empty_tables, 1);
    assert_eq!(snap.sample_queries, 0);
    assert_eq!(snap.runs, 1);
    Ok(())
}

#[tokio::test]
async fn more_slices_than_keys_collapses_to_distinct_keys() -> Result<()> {
    let table = upper_case_table(&["ID"], ids(1..=5));
    let run = slice(&table, "t", 20).await?;
    assert_eq!(table.requested_ranks(), vec![vec![1, 2, 3, 4, 5]]);
    assert_eq!(run.statements.len(), 4);
    assert_eq!(
        run.statements.last().map(String::as_str),
        Some("SELECT * FROM t WHERE ID >= 4 AND ID <= 5;")
    );
    assert_exact_cover(&run, table.rows());
    Ok(())
}

#[tokio::test]
async fn three_column_key_with_differing_leading_column() -> Result<()> {
    let int = |v: &[i64]| v.iter().copied().map(KeyValue::Integer).collect::<KeyTuple>();
    let rows = vec![int(&[1, 2, 3]), int(&[2, 0, 0]), int(&[4, 5, 5])];
    let table = MemoryTable::new(&["a", "b", "c"], rows.clone());
    let run = slice(&table, "t", 1).await?;

    assert_eq!(table.requested_ranks(), vec![vec![1, 3]]);
    let wheres = run.predicates.iter().map(ToString::to_string).collect::<Vec<_>>();
    assert_eq!(
        wheres,
        vec![
            "a = 1 AND b = 2 AND c >= 3",
            "a = 1 AND b > 2",
            "a > 1 AND a < 4",
            "a = 4 AND b < 5",
            "a = 4 AND b = 5 AND c <= 5",
        ]
    );
    assert_exact_cover(&run, &rows);
    Ok(())
}

#[tokio::test]
async fn single_row_table_gets_one_closed_slice() -> Result<()> {
    let table = upper_case_table(&["ID"], ids(7..=7));
    let run = slice(&table, "t", 8).await?;
    assert_eq!(run.statements, vec!["SELECT * FROM t WHERE ID >= 7 AND ID <= 7;"]);
    Ok(())
}

#[tokio::test]
async fn text_keys_are_quoted_and_escaped() -> Result<()> {
    let rows = ["alpha", "o'brien", "zulu"]
        .iter()
        .map(|s| vec![KeyValue::from(*s)])
        .collect::<Vec<_>>();
    let table = MemoryTable::new(&["name"], rows);
    let run = slice(&table, "t", 3).await?;
    assert_eq!(
        run.statements,
        vec![
            "SELECT * FROM t WHERE name >= 'alpha' AND name < 'o''brien';",
            "SELECT * FROM t WHERE name >= 'o''brien' AND name <= 'zulu';",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn mixed_case_postgres_key_is_quoted_everywhere() -> Result<()> {
    let table = MemoryTable::new(&["OrderId"], ids(1..=4));
    let run = slice(&table, "t", 1).await?;
    assert_eq!(
        run.statements,
        vec![r#"SELECT * FROM t WHERE "OrderId" >= 1 AND "OrderId" <= 4;"#]
    );
    assert_eq!(table.sampled_column_lists(), vec![r#""OrderId""#.to_string()]);
    assert_exact_cover(&run, table.rows());
    Ok(())
}

#[tokio::test]
async fn lower_case_postgres_key_stays_bare() -> Result<()> {
    let table = MemoryTable::new(&["order_id"], ids(1..=4));
    let run = slice(&table, "t", 1).await?;
    assert_eq!(
        run.statements,
        vec!["SELECT * FROM t WHERE order_id >= 1 AND order_id <= 4;"]
    );
    Ok(())
}

#[tokio::test]
async fn missing_primary_key_is_schema_error() {
    let table = MemoryTable::without_key(ids(1..=3));
    let err = slice(&table, "s.t", 4).await.expect_err("no primary key");
    assert!(matches!(err, SliceError::PrimaryKeyNotFound(ref name) if name == "s.t"));
    assert!(err.is_schema());
    assert!(table.requested_ranks().is_empty());
}

#[tokio::test]
async fn zero_slices_is_rejected() {
    let table = upper_case_table(&["ID"], ids(1..=3));
    let err = slice(&table, "t", 0).await.expect_err("zero slices");
    assert!(matches!(err, SliceError::InvalidSliceCount));
    assert!(err.is_configuration());
}

#[tokio::test]
async fn repeated_runs_are_identical() -> Result<()> {
    let table = upper_case_table(&["ID"], ids(1..=97));
    let first = slice(&table, "t", 7).await?;
    let second = slice(&table, "t", 7).await?;
    assert_eq!(first.statements, second.statements);
    assert_exact_cover(&first, table.rows());
    Ok(())
}

#[tokio::test]
async fn samples_at_most_slices_plus_one_rows() -> Result<()> {
    let table = upper_case_table(&["ID"], ids(1..=1000));
    let metrics = SliceMetrics::default();
    let run = generate_slice_sql(&table, &TableName::parse("t"), 6, &metrics).await?;
    let snap = metrics.snapshot();
    assert!(snap.rows_sampled <= 7);
    assert_eq!(snap.rows_counted, 1000);
    assert_eq!(snap.catalog_queries, 1);
    assert_eq!(snap.predicates, run.statements.len() as u64);
    assert_eq!(run.statements.len(), 6);
    Ok(())
}

#[tokio::test]
async fn profile_line_and_report_describe_the_run() -> Result<()> {
    let table = upper_case_table(&["ID"], ids(1..=30));
    let run = slice(&table, "t", 3).await?;

    let line = run.profile_line();
    assert!(line.starts_with("[profile] pk_cols=[ID], fetch="), "{line}");
    assert!(line.ends_with("boundaries=4, sqls=3"), "{line}");

    let report = serde_json::to_value(run.report())?;
    assert_eq!(report["table"], "t");
    assert_eq!(report["key_columns"], serde_json::json!(["ID"]));
    assert_eq!(report["boundaries"][3], serde_json::json!(["30"]));
    assert_eq!(report["statements"].as_array().map(Vec::len), Some(3));
    Ok(())
}

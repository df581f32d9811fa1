//! `pkslice` binary: prints primary-key slice statements for one table.
//!
//! Statements go to stdout; logs go to `--log-file` so the output can be piped
//! straight into a parallel runner.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use pkslice::{generate_slice_sql, Dialect, OutputFormat, SliceConfig, SliceMetrics};
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Generate primary-key based slice SQL statements.
#[derive(Parser, Debug)]
#[command(name = "pkslice")]
struct Args {
    /// Database type: `pg` or `ora`.
    #[arg(long, env = "PKSLICE_DBTYPE", value_parser = parse_dialect)]
    dbtype: Dialect,

    /// Connection string passed to the driver.
    #[arg(long, env = "PKSLICE_CONN")]
    conn: String,

    /// Table name, optionally schema-qualified (`schema.table`).
    #[arg(long, env = "PKSLICE_TABLE")]
    table: String,

    /// Number of desired slices.
    #[arg(long, env = "PKSLICE_SLICES", default_value_t = 8)]
    slices: u32,

    /// Print profiling info to stderr.
    #[arg(long, env = "PKSLICE_PROFILE", default_value_t = false)]
    profile: bool,

    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[arg(long, env = "PKSLICE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log file path (appended). `-` logs to stderr.
    #[arg(long, env = "PKSLICE_LOG_FILE", default_value = "pkslice.log")]
    log_file: PathBuf,

    /// Output format for the generated statements.
    #[arg(long, env = "PKSLICE_FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn parse_dialect(raw: &str) -> Result<Dialect, String> {
    raw.parse::<Dialect>().map_err(|err| err.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, &args.log_file)?;

    let config = SliceConfig::new(args.dbtype, args.conn, &args.table, args.slices)
        .context("invalid configuration")?
        .with_profile(args.profile)
        .with_format(args.format);
    info!(
        dbtype = %config.dialect,
        table = %config.table,
        slices = config.slices,
        "start"
    );

    let source = pkslice::connect(config.dialect, &config.conn)
        .await
        .with_context(|| format!("failed to connect ({})", config.dialect))?;
    let metrics = SliceMetrics::default();
    let run = generate_slice_sql(source.as_ref(), &config.table, config.slices, &metrics)
        .await
        .with_context(|| format!("failed to slice table {}", config.table))?;

    match config.format {
        OutputFormat::Text => {
            for statement in &run.statements {
                println!("{statement}");
            }
        }
        OutputFormat::Json => {
            let doc = serde_json::to_string_pretty(&run.report())
                .context("failed to encode slice report")?;
            println!("{doc}");
        }
    }

    if config.profile {
        eprintln!("{}", run.profile_line());
    }
    Ok(())
}

fn init_logging(level: &str, log_file: &Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("pkslice={level},pkslice_plan={level},warn")))
        .context("invalid --log-level")?;

    let to_stderr = log_file.as_os_str() == "-";
    let writer = if to_stderr {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("failed to open log file {}", log_file.display()))?;
        BoxMakeWriter::new(Mutex::new(file))
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(to_stderr)
        .with_writer(writer)
        .with_env_filter(filter)
        .init();
    Ok(())
}

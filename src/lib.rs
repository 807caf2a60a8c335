pub mod assemble;
pub mod classify;
pub mod cli;
pub mod data;
pub mod dates;
pub mod error;
pub mod export;
pub mod io_utils;
pub mod merge;
pub mod period;
pub mod report;
pub mod request;
pub mod session;
pub mod sources;
pub mod summary;
pub mod table;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, OutputFormat},
    request::ReportRequest,
    session::{DEFAULT_SESSION_TTL_MINUTES, Session, UploadedSource},
    sources::{SourceKind, upload},
    summary::SUMMARY_HEADERS,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("impact_series", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let mut session = invocation_session(Utc::now());
    match cli.command {
        Commands::Probe(args) => handle_probe(&args, &mut session),
        Commands::Report(args) => handle_report(&args, &mut session),
    }
}

/// One session per CLI invocation; it lives the default session lifetime.
fn invocation_session(now: DateTime<Utc>) -> Session {
    Session::new(now, Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
}

fn handle_probe(args: &cli::ProbeArgs, session: &mut Session) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Probing '{}' with delimiter '{}'",
        args.input.display(),
        printable_delimiter(delimiter)
    );
    let rows = upload::load_upload(&args.input, delimiter, encoding)?;
    let prepared = UploadedSource::prepare(rows, args.convert_dates)
        .with_context(|| format!("Classifying columns of {:?}", args.input))?;

    let classification = &prepared.classification;
    let headers = vec!["column".to_string(), "role".to_string()];
    let roles = classification
        .date_column
        .iter()
        .map(|c| vec![c.clone(), "date".to_string()])
        .chain(
            classification
                .numeric_columns
                .iter()
                .map(|c| vec![c.clone(), "numeric".to_string()]),
        )
        .chain(
            classification
                .categorical_columns
                .iter()
                .map(|c| vec![c.clone(), "categorical".to_string()]),
        )
        .collect::<Vec<_>>();
    table::print_table(&headers, &roles);
    println!(
        "date range: {} to {}",
        prepared.range.min_date, prepared.range.max_date
    );
    info!(
        "Classified {} row(s) into {} column(s)",
        prepared.rows.len(),
        roles.len()
    );
    session.store_upload(SourceKind::Upload.tag(), prepared);
    Ok(())
}

fn handle_report(args: &cli::ReportArgs, session: &mut Session) -> Result<()> {
    let request = ReportRequest::load(&args.request)
        .with_context(|| format!("Loading report request {:?}", args.request))?;
    debug!(
        "Report window {}..={} with event {} targeting '{}'",
        request.from_date, request.to_date, request.event_date, request.target_event
    );
    let output = report::run_report(&request, session)?;

    if args.table {
        print!("{}", table::render_dense_table(&output.table));
    } else {
        let path = args.output.as_deref();
        match args.format {
            OutputFormat::Csv => {
                let delimiter = io_utils::resolve_output_delimiter(path, args.delimiter);
                let mut writer = io_utils::open_csv_writer(path, delimiter)?;
                export::write_csv(&mut writer, &output.table)?;
            }
            OutputFormat::Json => {
                let mut writer = io_utils::open_output(path)?;
                export::write_json(
                    &mut writer,
                    &output.table,
                    output.has_filled_gaps,
                    &output.window,
                )?;
                writeln!(writer).context("Writing JSON output")?;
                writer.flush().context("Flushing JSON output")?;
            }
        }
    }

    if args.summary {
        let headers = SUMMARY_HEADERS
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();
        let rows = output
            .summary
            .iter()
            .map(|s| s.to_row())
            .collect::<Vec<_>>();
        println!();
        table::print_table(&headers, &rows);
    }

    info!(
        "Report of {} row(s) x {} column(s); pre-period {:?}, post-period {:?}",
        output.table.row_count(),
        output.table.columns().len(),
        output.window.pre_period.as_pair(),
        output.window.post_period.as_pair()
    );
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}

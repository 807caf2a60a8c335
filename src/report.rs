//! End-to-end report pipeline.
//!
//! Payloads named by a [`ReportRequest`] are read and normalized into
//! [`SourceBatch`]es, merged in the fixed connector order, assembled into a
//! dense table over the requested window and handed back together with the
//! impact window and a column summary.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use encoding_rs::UTF_8;
use log::{info, warn};
use serde::Serialize;

use crate::{
    assemble::{DenseTable, assemble},
    classify::{ColumnClassification, classify},
    data::RawRow,
    error::{MergeError, MergeResult},
    io_utils,
    merge::{MappingSettings, MergedSeries, merge},
    period::ImpactWindow,
    request::{ReportRequest, TabularRequest},
    session::{Session, UploadedSource},
    sources::{
        NORMALIZED_DATE_COLUMN, SourceKind,
        ads::{self, AdsRow},
        analytics::{self, BatchReportResponse},
        grouped,
        sheet::{self, ValueRange},
        upload, warehouse,
    },
    summary::{ColumnSummary, summarize},
};

pub const FILLED_GAPS_WARNING: &str = "Some values have 0 in them which are from your data or where dates were missing and were filled in automatically";

/// One normalized source ready to merge.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub kind: SourceKind,
    pub rows: Vec<RawRow>,
    pub settings: MappingSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub table: DenseTable,
    pub has_filled_gaps: bool,
    pub warning: Option<&'static str>,
    pub window: ImpactWindow,
    pub summary: Vec<ColumnSummary>,
}

/// Declared metrics must exist in the batch and be numeric.
pub fn validate_metrics(
    kind: SourceKind,
    classification: &ColumnClassification,
    metrics: &[String],
) -> MergeResult<()> {
    for metric in metrics {
        if classification.is_categorical(metric) {
            return Err(MergeError::NonNumericMetric {
                tag: kind.tag().to_string(),
                column: metric.clone(),
            });
        }
        if !classification.is_numeric(metric) {
            return Err(MergeError::missing_key(kind.tag(), metric));
        }
    }
    Ok(())
}

/// Merges batches in [`SourceKind::MERGE_ORDER`], whatever order they arrive in.
pub fn merge_batches(batches: &[SourceBatch]) -> MergeResult<MergedSeries> {
    let mut merged = MergedSeries::new();
    for kind in SourceKind::MERGE_ORDER {
        for batch in batches.iter().filter(|batch| batch.kind == kind) {
            merged = merge(&batch.rows, &batch.settings, merged, kind.tag())?;
        }
    }
    Ok(merged)
}

pub fn assemble_report(
    merged: &MergedSeries,
    request: &ReportRequest,
    window: ImpactWindow,
) -> MergeResult<ReportOutput> {
    let (table, has_filled_gaps) = assemble(
        merged,
        &request.from_date,
        &request.to_date,
        &request.target_event,
    )?;
    let summary = summarize(&table);
    Ok(ReportOutput {
        table,
        has_filled_gaps,
        warning: has_filled_gaps.then_some(FILLED_GAPS_WARNING),
        window,
        summary,
    })
}

pub fn run_report(request: &ReportRequest, session: &mut Session) -> Result<ReportOutput> {
    let window = ImpactWindow::from_dates(&request.from_date, &request.to_date, &request.event_date)?;
    if request.sources.is_empty() {
        warn!("Report request names no sources");
    }
    let batches = load_batches(request, session)?;
    let merged = merge_batches(&batches)?;
    info!(
        "Merged {} source(s) into {} date(s)",
        batches.len(),
        merged.len()
    );
    let output = assemble_report(&merged, request, window)?;
    if let Some(message) = output.warning {
        warn!("{message}");
    }
    Ok(output)
}

/// Reads and normalizes every source the request names. The upload is
/// stored on the session before it is merged.
pub fn load_batches(request: &ReportRequest, session: &mut Session) -> Result<Vec<SourceBatch>> {
    let sources = &request.sources;
    let mut batches = Vec::new();

    if let Some(ads_request) = &sources.gads {
        let rows: Vec<AdsRow> = read_json_file(&ads_request.path)?;
        let normalized = ads::normalize(&rows, &ads_request.campaigns, &ads_request.metrics)?;
        batches.push(SourceBatch {
            kind: SourceKind::Ads,
            rows: normalized,
            settings: MappingSettings::new(NORMALIZED_DATE_COLUMN, ads_request.metrics.iter().cloned()),
        });
    }

    if let Some(analytics_request) = &sources.ga4 {
        let response: BatchReportResponse = read_json_file(&analytics_request.path)?;
        let metrics = analytics_request
            .metrics
            .clone()
            .unwrap_or_else(|| response.metric_names());
        batches.push(SourceBatch {
            kind: SourceKind::Analytics,
            rows: analytics::rows_from_response(&response)?,
            settings: MappingSettings::new(NORMALIZED_DATE_COLUMN, metrics),
        });
    }

    if let Some(upload_request) = &sources.csv {
        let path = &upload_request.path;
        let delimiter = io_utils::resolve_input_delimiter(path, upload_request.delimiter()?);
        let encoding = io_utils::resolve_encoding(upload_request.encoding.as_deref())?;
        let rows = upload::load_upload(path, delimiter, encoding)?;
        let prepared = UploadedSource::prepare(rows, upload_request.convert_dates)
            .with_context(|| format!("Preparing upload {path:?}"))?;
        validate_metrics(SourceKind::Upload, &prepared.classification, &upload_request.metrics)?;
        let batch = SourceBatch {
            kind: SourceKind::Upload,
            rows: prepared.rows.clone(),
            settings: MappingSettings::new(prepared.date_column(), upload_request.metrics.iter().cloned()),
        };
        session.store_upload(SourceKind::Upload.tag(), prepared);
        batches.push(batch);
    }

    if let Some(sheet_request) = &sources.gsheet {
        let range: ValueRange = read_json_file(&sheet_request.path)?;
        let rows = sheet::rows_from_grid(&range)?;
        batches.push(tabular_batch(SourceKind::Sheet, rows, sheet_request)?);
    }

    if let Some(warehouse_request) = &sources.bigquery {
        let results = io_utils::read_json(&warehouse_request.path)?;
        let rows = warehouse::rows_from_results(&results)?;
        batches.push(tabular_batch(SourceKind::Warehouse, rows, warehouse_request)?);
    }

    if let Some(benchmark_request) = &sources.benchmark {
        let path = &benchmark_request.path;
        let delimiter = io_utils::resolve_input_delimiter(path, None);
        let rows = upload::load_upload(path, delimiter, UTF_8)?;
        let grouped = grouped::group_and_sum(&rows, &benchmark_request.group)?;
        batches.push(SourceBatch {
            kind: SourceKind::Benchmark,
            rows: grouped,
            settings: MappingSettings::new(NORMALIZED_DATE_COLUMN, benchmark_request.group.columns()),
        });
    }

    for batch in &batches {
        info!(
            "Loaded {} row(s) from '{}' for metric(s) {:?}",
            batch.rows.len(),
            batch.kind,
            batch.settings.metrics
        );
    }
    Ok(batches)
}

fn tabular_batch(
    kind: SourceKind,
    mut rows: Vec<RawRow>,
    request: &TabularRequest,
) -> Result<SourceBatch> {
    let classification = classify(&mut rows)?;
    let date_column = match &request.date_column {
        Some(column) => column.clone(),
        None => classification.require_date_column()?.to_string(),
    };
    validate_metrics(kind, &classification, &request.metrics)?;
    Ok(SourceBatch {
        kind,
        rows,
        settings: MappingSettings::new(date_column, request.metrics.iter().cloned()),
    })
}

fn read_json_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path).with_context(|| format!("Opening payload {path:?}"))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Parsing JSON payload {path:?}"))
}

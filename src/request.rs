//! Report requests.
//!
//! A request names the analysis window, the event date, the target metric
//! and, per connector, the payload file to read plus the columns to merge.
//! Requests are YAML by default; a `.json` extension selects JSON.
//!
//! ```yaml
//! from_date: 2024-01-01
//! to_date: 2024-01-31
//! event_date: 2024-01-21
//! target_event: csv_orders
//! sources:
//!   csv:
//!     path: orders.csv
//!     metrics: [orders]
//!   ga4:
//!     path: ga4.json
//! ```

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::{
    cli::parse_delimiter,
    sources::{ads::CampaignSelection, grouped::GroupSettings},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportRequest {
    pub from_date: String,
    pub to_date: String,
    pub event_date: String,
    /// Namespaced metric (`<tag>_<metric>`) the estimator models.
    pub target_event: String,
    #[serde(default)]
    pub sources: SourceRequests,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceRequests {
    #[serde(default)]
    pub gads: Option<AdsRequest>,
    #[serde(default)]
    pub ga4: Option<AnalyticsRequest>,
    #[serde(default)]
    pub csv: Option<UploadRequest>,
    #[serde(default)]
    pub gsheet: Option<TabularRequest>,
    #[serde(default)]
    pub bigquery: Option<TabularRequest>,
    #[serde(default)]
    pub benchmark: Option<BenchmarkRequest>,
}

impl SourceRequests {
    pub fn is_empty(&self) -> bool {
        self.gads.is_none()
            && self.ga4.is_none()
            && self.csv.is_none()
            && self.gsheet.is_none()
            && self.bigquery.is_none()
            && self.benchmark.is_none()
    }

    fn paths_mut(&mut self) -> impl Iterator<Item = &mut PathBuf> {
        let gads = self.gads.as_mut().map(|s| &mut s.path);
        let ga4 = self.ga4.as_mut().map(|s| &mut s.path);
        let csv = self.csv.as_mut().map(|s| &mut s.path);
        let gsheet = self.gsheet.as_mut().map(|s| &mut s.path);
        let bigquery = self.bigquery.as_mut().map(|s| &mut s.path);
        let benchmark = self.benchmark.as_mut().map(|s| &mut s.path);
        [gads, ga4, csv, gsheet, bigquery, benchmark]
            .into_iter()
            .flatten()
    }
}

/// Campaign-day rows exported from the ad platform, as a JSON array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdsRequest {
    pub path: PathBuf,
    #[serde(default)]
    pub campaigns: CampaignSelection,
    pub metrics: Vec<String>,
}

/// A batch report response; every reported metric is merged unless a
/// subset is named.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsRequest {
    pub path: PathBuf,
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub metrics: Vec<String>,
    /// Rewrite `Jan 05 2024` style dates to ISO before merging.
    #[serde(default)]
    pub convert_dates: bool,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl UploadRequest {
    pub fn delimiter(&self) -> Result<Option<u8>> {
        self.delimiter
            .as_deref()
            .map(|value| parse_delimiter(value).map_err(|err| anyhow!(err)))
            .transpose()
            .with_context(|| format!("Invalid delimiter for upload {:?}", self.path))
    }
}

/// Spreadsheet ranges and warehouse results. The date column defaults to
/// the one the classifier finds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TabularRequest {
    pub path: PathBuf,
    #[serde(default)]
    pub date_column: Option<String>,
    pub metrics: Vec<String>,
}

/// Benchmark CSV export grouped by category before merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRequest {
    pub path: PathBuf,
    #[serde(flatten)]
    pub group: GroupSettings,
}

impl ReportRequest {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening report request {path:?}"))?;
        let reader = BufReader::new(file);
        let mut request: ReportRequest = if is_json(path) {
            serde_json::from_reader(reader).context("Parsing report request JSON")?
        } else {
            serde_yaml::from_reader(reader).context("Parsing report request YAML")?
        };
        if let Some(base) = path.parent() {
            request.resolve_paths(base);
        }
        Ok(request)
    }

    /// Anchors relative payload paths at `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in self.sources.paths_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use impact_series::data::RawRow;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes one payload per connector plus a request that names them all.
    pub fn write_full_report(&self) -> PathBuf {
        self.write(
            "orders.csv",
            "Date, orders, store\n2024-01-01, 4, north\n2024-01-03,\"1,200\", south\n",
        );
        self.write(
            "ga4.json",
            r#"{"reports":[{"metricHeaders":[{"name":"sessions"},{"name":"conversions"}],
                "rows":[{"dimensionValues":[{"value":"20240102"}],
                         "metricValues":[{"value":"30"},{"value":"2"}]}]}]}"#,
        );
        self.write(
            "ads.json",
            r#"[{"date":"2024-01-01","customer_id":111,"campaign_id":1,"impressions":100,"clicks":10,"cost_micros":500},
                {"date":"2024-01-01","customer_id":111,"campaign_id":2,"impressions":300,"clicks":10,"cost_micros":1500},
                {"date":"2024-01-02","customer_id":222,"campaign_id":9,"impressions":50,"clicks":5,"cost_micros":10}]"#,
        );
        self.write(
            "sheet.json",
            r#"{"values":[["day_date","signups","channel"],["2024-01-02","7","email"],["2024-01-04"]]}"#,
        );
        self.write(
            "warehouse.json",
            r#"[{"order_date":"2024-01-04","revenue":99.5},{"order_date":"2024-01-05","revenue":null}]"#,
        );
        self.write(
            "bench.csv",
            "date,brand,region,spend\n2024-01-01,acme,EU,10\n2024-01-01,acme,EU,5\n2024-01-01,acme,US,100\n2024-01-02,globex,EU,3\n",
        );
        self.write(
            "request.yaml",
            r#"from_date: 2024-01-01
to_date: 2024-01-05
event_date: 2024-01-04
target_event: csv_orders
sources:
  gads:
    path: ads.json
    campaigns:
      "111": ["111-0"]
    metrics: [clicks, ctr]
  ga4:
    path: ga4.json
    metrics: [sessions]
  csv:
    path: orders.csv
    metrics: [orders]
  gsheet:
    path: sheet.json
    metrics: [signups]
  bigquery:
    path: warehouse.json
    metrics: [revenue]
  benchmark:
    path: bench.csv
    date_column: date
    category_column: brand
    filters:
      region: [EU]
    extract:
      - category: acme
        field: spend
      - category: globex
        field: spend
"#,
        )
    }
}

/// Builds a row from `(column, value)` text pairs.
pub fn row(pairs: &[(&str, &str)]) -> RawRow {
    pairs.iter().copied().collect()
}

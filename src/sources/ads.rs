//! Ad platform campaign-day rows.
//!
//! Rows arrive per campaign and day. They are filtered to the selected
//! campaigns, summed per day, and the ratio metrics are derived from the
//! daily sums so they stay consistent with the summed counters.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Deserializer};

use crate::{
    data::RawRow,
    error::{MergeError, MergeResult},
    sources::{SourceKind, dated_row},
};

pub const ADS_METRICS: &[&str] = &[
    "impressions",
    "clicks",
    "video_views",
    "cost_micros",
    "conversions",
    "view_through_conversions",
    "ctr",
    "average_cpc",
    "average_cost",
];

/// Campaign id suffix meaning "every campaign of this customer".
const ALL_CAMPAIGNS_SUFFIX: &str = "-0";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdsRow {
    pub date: String,
    #[serde(default, deserialize_with = "id_text")]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "id_text")]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub impressions: f64,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub video_views: f64,
    #[serde(default)]
    pub cost_micros: f64,
    #[serde(default)]
    pub conversions: f64,
    #[serde(default)]
    pub view_through_conversions: f64,
}

fn id_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Customer id to selected campaign ids.
pub type CampaignSelection = IndexMap<String, Vec<String>>;

fn is_selected(row: &AdsRow, selection: &CampaignSelection) -> bool {
    if selection.is_empty() {
        return true;
    }
    selection.iter().any(|(customer, campaigns)| {
        let customer_matches = row.customer_id.as_deref().is_none_or(|id| id == customer);
        let all_campaigns = format!("{customer}{ALL_CAMPAIGNS_SUFFIX}");
        let campaign_matches = campaigns.iter().any(|c| *c == all_campaigns)
            || row
                .campaign_id
                .as_deref()
                .is_some_and(|id| campaigns.iter().any(|c| c == id));
        customer_matches && campaign_matches
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyTotals {
    pub rows: usize,
    pub impressions: f64,
    pub clicks: f64,
    pub video_views: f64,
    pub cost_micros: f64,
    pub conversions: f64,
    pub view_through_conversions: f64,
}

impl DailyTotals {
    fn add(&mut self, row: &AdsRow) {
        self.rows += 1;
        self.impressions += row.impressions;
        self.clicks += row.clicks;
        self.video_views += row.video_views;
        self.cost_micros += row.cost_micros;
        self.conversions += row.conversions;
        self.view_through_conversions += row.view_through_conversions;
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        let value = match name {
            "impressions" => self.impressions,
            "clicks" => self.clicks,
            "video_views" => self.video_views,
            "cost_micros" => self.cost_micros,
            "conversions" => self.conversions,
            "view_through_conversions" => self.view_through_conversions,
            "ctr" => ratio(self.clicks, self.impressions),
            "average_cpc" => ratio(self.cost_micros, self.clicks),
            "average_cost" => ratio(self.cost_micros, self.rows as f64),
            _ => return None,
        };
        Some(value)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub fn daily_totals(rows: &[AdsRow], selection: &CampaignSelection) -> IndexMap<String, DailyTotals> {
    let mut totals: IndexMap<String, DailyTotals> = IndexMap::new();
    let mut skipped = 0usize;
    for row in rows {
        if !is_selected(row, selection) {
            skipped += 1;
            continue;
        }
        totals.entry(row.date.clone()).or_default().add(row);
    }
    debug!(
        "Aggregated {} ad row(s) into {} day(s); {skipped} outside the campaign selection",
        rows.len() - skipped,
        totals.len()
    );
    totals
}

/// One normalized row per day carrying only the requested metrics.
pub fn normalize(
    rows: &[AdsRow],
    selection: &CampaignSelection,
    metrics: &[String],
) -> MergeResult<Vec<RawRow>> {
    if let Some(unknown) = metrics.iter().find(|m| !ADS_METRICS.contains(&m.as_str())) {
        return Err(MergeError::missing_key(SourceKind::Ads.tag(), unknown));
    }
    Ok(daily_totals(rows, selection)
        .iter()
        .map(|(date, totals)| {
            dated_row(
                date,
                metrics
                    .iter()
                    .map(|m| (m.as_str(), totals.metric(m).unwrap_or_default())),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;

    fn ad(date: &str, campaign: &str, impressions: f64, clicks: f64, cost: f64) -> AdsRow {
        AdsRow {
            date: date.into(),
            customer_id: Some("111".into()),
            campaign_id: Some(campaign.into()),
            impressions,
            clicks,
            cost_micros: cost,
            ..AdsRow::default()
        }
    }

    #[test]
    fn campaigns_sum_per_day_and_ratios_use_sums() {
        let rows = vec![
            ad("2024-01-01", "1", 100.0, 10.0, 5_000.0),
            ad("2024-01-01", "2", 300.0, 10.0, 15_000.0),
            ad("2024-01-02", "1", 0.0, 0.0, 0.0),
        ];
        let totals = daily_totals(&rows, &CampaignSelection::new());
        let day = &totals["2024-01-01"];
        assert_eq!(day.metric("impressions"), Some(400.0));
        assert_eq!(day.metric("ctr"), Some(0.05));
        assert_eq!(day.metric("average_cpc"), Some(1_000.0));
        assert_eq!(day.metric("average_cost"), Some(10_000.0));
        assert_eq!(totals["2024-01-02"].metric("ctr"), Some(0.0));
    }

    #[test]
    fn selection_limits_campaigns_unless_all_sentinel() {
        let rows = vec![
            ad("2024-01-01", "1", 100.0, 1.0, 0.0),
            ad("2024-01-01", "2", 50.0, 1.0, 0.0),
        ];
        let mut only_one = CampaignSelection::new();
        only_one.insert("111".into(), vec!["2".into()]);
        assert_eq!(daily_totals(&rows, &only_one)["2024-01-01"].impressions, 50.0);

        let mut all = CampaignSelection::new();
        all.insert("111".into(), vec!["111-0".into()]);
        assert_eq!(daily_totals(&rows, &all)["2024-01-01"].impressions, 150.0);
    }

    #[test]
    fn only_requested_metrics_are_emitted() {
        let rows = vec![ad("2024-01-01", "1", 100.0, 4.0, 0.0)];
        let normalized =
            normalize(&rows, &CampaignSelection::new(), &["clicks".to_string()]).unwrap();
        assert_eq!(
            normalized[0].columns().collect::<Vec<_>>(),
            vec!["date", "clicks"]
        );
        assert_eq!(normalized[0].get("clicks"), Some(&Cell::Number(4.0)));
    }

    #[test]
    fn unknown_metric_is_a_missing_key() {
        assert!(matches!(
            normalize(&[], &CampaignSelection::new(), &["reach".to_string()]),
            Err(MergeError::MissingKey { .. })
        ));
    }

    #[test]
    fn numeric_ids_deserialize_as_text() {
        let row: AdsRow = serde_json::from_value(serde_json::json!({
            "date": "2024-01-01",
            "customer_id": 111,
            "campaign_id": 42,
            "clicks": 3
        }))
        .unwrap();
        assert_eq!(row.campaign_id.as_deref(), Some("42"));
        assert_eq!(row.clicks, 3.0);
    }
}

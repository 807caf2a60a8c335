use chrono::{Duration, NaiveDate};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use impact_series::{
    assemble::assemble,
    data::RawRow,
    merge::{MappingSettings, MergedSeries, merge},
};

const DAYS: i64 = 730;

fn generate_rows(days: i64, stride: i64) -> Vec<RawRow> {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).expect("valid date");
    (0..days)
        .step_by(stride as usize)
        .map(|offset| {
            let date = (start + Duration::days(offset)).to_string();
            let mut row = RawRow::new();
            row.insert("date", date);
            row.insert("clicks", (offset % 97).to_string());
            row.insert("impressions", (offset * 13 % 1009).to_string());
            row.insert("cost", format!("{}.25", offset % 50));
            row
        })
        .collect()
}

fn merged_sources() -> MergedSeries {
    let settings = MappingSettings::new("date", ["clicks", "impressions", "cost"]);
    let mut merged = MergedSeries::new();
    for (tag, stride) in [("gads", 1), ("ga4", 2), ("csv", 3), ("bq", 7)] {
        merged = merge(&generate_rows(DAYS, stride), &settings, merged, tag).expect("merge");
    }
    merged
}

fn bench_merge(c: &mut Criterion) {
    let settings = MappingSettings::new("date", ["clicks", "impressions", "cost"]);
    let rows = generate_rows(DAYS, 1);
    c.bench_function("merge_two_years_daily", |b| {
        b.iter_batched(
            MergedSeries::new,
            |acc| merge(&rows, &settings, acc, "gads").expect("merge"),
            BatchSize::SmallInput,
        )
    });
}

fn bench_assemble(c: &mut Criterion) {
    let merged = merged_sources();
    c.bench_function("assemble_four_sources", |b| {
        b.iter(|| assemble(&merged, "2022-01-01", "2023-12-31", "csv_clicks").expect("assemble"))
    });
}

criterion_group!(benches, bench_merge, bench_assemble);
criterion_main!(benches);

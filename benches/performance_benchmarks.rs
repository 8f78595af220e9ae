use chrono::{Days, NaiveDate, NaiveTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glucors::models::{Locale, MealContext, Reading};
use glucors::patterns::PatternAnalyzer;
use glucors::progress::evaluate_progress;
use glucors::report::{ReportBuilder, UserSnapshot};

/// Performance benchmarks for the glucose analytics
///
/// Histories grow from a week of logging to five years.

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
}

/// Three readings a day (fasting, pre-meal, post-meal) for `days` days
fn create_reading_series(days: u64) -> Vec<Reading> {
    (0..days)
        .flat_map(|d| {
            let date = today().checked_sub_days(Days::new(d)).unwrap();
            let wobble = (d % 11) as f64 * 4.0;
            vec![
                Reading::new(90.0 + wobble, date)
                    .with_time(NaiveTime::from_hms_opt(7, 0, 0).unwrap())
                    .with_context(MealContext::Fasting),
                Reading::new(115.0 + wobble, date)
                    .with_time(NaiveTime::from_hms_opt(12, 30, 0).unwrap())
                    .with_context(MealContext::PreMeal),
                Reading::new(165.0 + wobble, date)
                    .with_time(NaiveTime::from_hms_opt(14, 30, 0).unwrap())
                    .with_context(MealContext::PostMeal),
            ]
        })
        .collect()
}

fn bench_pattern_analysis(c: &mut Criterion) {
    let analyzer = PatternAnalyzer::new();
    let mut group = c.benchmark_group("Pattern Analysis");

    for &days in &[7, 30, 365, 1825] {
        let readings = create_reading_series(days);

        group.throughput(Throughput::Elements(readings.len() as u64));
        group.bench_with_input(BenchmarkId::new("analyze", days), &readings, |b, readings| {
            b.iter(|| analyzer.analyze(black_box(readings)));
        });
    }

    group.finish();
}

fn bench_progress(c: &mut Criterion) {
    let mut group = c.benchmark_group("Progress");

    for &days in &[7, 90, 365] {
        let readings = create_reading_series(days);

        group.throughput(Throughput::Elements(readings.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("evaluate_progress", days),
            &readings,
            |b, readings| {
                b.iter(|| evaluate_progress(black_box(readings), today(), Locale::En));
            },
        );
    }

    group.finish();
}

fn bench_batch_reports(c: &mut Criterion) {
    let builder = ReportBuilder::new();
    let mut group = c.benchmark_group("Dashboard Reports");
    group.sample_size(20);

    for &users in &[10, 100, 500] {
        let snapshots: Vec<UserSnapshot> = (0..users)
            .map(|i| UserSnapshot {
                user_id: format!("user-{}", i),
                readings: create_reading_series(30 + (i as u64 % 60)),
                ..UserSnapshot::default()
            })
            .collect();

        group.throughput(Throughput::Elements(users as u64));
        group.bench_with_input(
            BenchmarkId::new("build_batch", users),
            &snapshots,
            |b, snapshots| {
                b.iter(|| builder.build_batch(black_box(snapshots), today(), Locale::Sw));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_pattern_analysis,
    bench_progress,
    bench_batch_reports
);

criterion_main!(benches);

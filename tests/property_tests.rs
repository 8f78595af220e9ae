use chrono::{Days, NaiveDate, NaiveTime};
use glucors::alerts::generate_alerts;
use glucors::foods::ImpactTier;
use glucors::models::{Locale, MealContext, Reading};
use glucors::patterns::analyze_patterns;
use glucors::predictions::estimated_spike;
use glucors::progress::{calculate_level, current_streak, level_points};
use glucors::report::{build_report, UserSnapshot};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 15).unwrap()
}

fn context_from(index: u8) -> MealContext {
    match index % 6 {
        0 => MealContext::PreMeal,
        1 => MealContext::PostMeal,
        2 => MealContext::Fasting,
        3 => MealContext::Bedtime,
        4 => MealContext::Random,
        _ => MealContext::None,
    }
}

/// Readings within the last 30 days with distinct (date, time) keys per index
fn reading_strategy() -> impl Strategy<Value = Vec<Reading>> {
    prop::collection::vec((40.0f64..400.0, 0u64..30, 0u32..24, any::<u8>()), 0..40).prop_map(
        |raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (value, days_back, hour, context))| {
                    let minute = (i % 60) as u32;
                    Reading::new(value, today().checked_sub_days(Days::new(days_back)).unwrap())
                        .with_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
                        .with_context(context_from(context))
                })
                .collect()
        },
    )
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #[test]
        fn analysis_does_not_mutate_input(readings in reading_strategy()) {
            let before = readings.clone();
            let _ = analyze_patterns(&readings);
            let user = UserSnapshot { readings: readings.clone(), ..UserSnapshot::default() };
            let _ = build_report(&user, today(), Locale::En);
            prop_assert_eq!(readings, before);
        }

        #[test]
        fn report_is_idempotent(readings in reading_strategy()) {
            let user = UserSnapshot { readings, ..UserSnapshot::default() };
            let first = build_report(&user, today(), Locale::Sw);
            let second = build_report(&user, today(), Locale::Sw);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn analysis_ignores_input_order(readings in reading_strategy()) {
            let mut reversed = readings.clone();
            reversed.reverse();
            prop_assert_eq!(analyze_patterns(&readings), analyze_patterns(&reversed));
        }

        #[test]
        fn short_history_never_alerts(readings in reading_strategy()) {
            let short: Vec<Reading> = readings.into_iter().take(2).collect();
            let snapshot = analyze_patterns(&short);
            prop_assert!(snapshot.is_none());
            prop_assert!(generate_alerts(snapshot.as_ref(), Locale::En).is_empty());
        }

        #[test]
        fn spike_follows_tier_formula(baseline in 0.0f64..400.0) {
            let deviation = baseline - 150.0;
            let expected = [
                (ImpactTier::VeryHigh, 80.0 + deviation * 0.3),
                (ImpactTier::High, 50.0 + deviation * 0.2),
                (ImpactTier::Medium, 30.0 + deviation * 0.1),
                (ImpactTier::Low, 15.0),
                (ImpactTier::None, 0.0),
            ];
            for (tier, spike) in expected {
                prop_assert!((estimated_spike(tier, baseline) - spike).abs() < 1e-9);
            }
        }

        #[test]
        fn spike_grows_with_baseline(a in 0.0f64..400.0, b in 0.0f64..400.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            for tier in [ImpactTier::VeryHigh, ImpactTier::High, ImpactTier::Medium] {
                prop_assert!(estimated_spike(tier, low) <= estimated_spike(tier, high));
            }
        }

        #[test]
        fn streak_bounded_by_distinct_dates(readings in reading_strategy()) {
            let distinct: BTreeSet<NaiveDate> = readings.iter().map(|r| r.date).collect();
            prop_assert!(current_streak(&readings, today()) as usize <= distinct.len());
        }

        #[test]
        fn level_is_monotonic(a in 0usize..200, b in 0usize..200) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let low_level = calculate_level(level_points(low), Locale::En).level;
            let high_level = calculate_level(level_points(high), Locale::En).level;
            prop_assert!(low_level <= high_level);
            prop_assert!((1..=4).contains(&high_level));
        }
    }
}

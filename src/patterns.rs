//! Glucose pattern analysis
//!
//! Reduces a reading history to aggregate statistics (per-context averages,
//! high/low counts, hour-of-day buckets) and a short-term trend. The analyzer
//! sorts its own view of the readings by (date, time) before inspecting the
//! trailing trend window, so callers may pass readings in any order.

use crate::models::{MealContext, Reading};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Days of history behind alerts and food predictions
pub const ANALYSIS_WINDOW_DAYS: u64 = 30;

/// Direction of the most recent readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

/// Thresholds used by the pattern analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Minimum readings required before a snapshot is produced
    pub min_readings: usize,

    /// Pre-meal readings above this value count as high (mg/dL)
    pub pre_meal_high: f64,

    /// Post-meal readings above this value count as high (mg/dL)
    pub post_meal_high: f64,

    /// Readings below this value count as low, regardless of context (mg/dL)
    pub low_threshold: f64,

    /// Hour bucket used for readings without a time of day
    pub default_hour: u32,

    /// Number of trailing readings inspected for the trend
    pub trend_window: usize,

    /// Minimum readings in the window for a non-stable trend
    pub trend_min_points: usize,

    /// Change between first and last reading of the window that counts as a trend (mg/dL)
    pub trend_delta: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        PatternConfig {
            min_readings: 3,
            pre_meal_high: 130.0,
            post_meal_high: 180.0,
            low_threshold: 80.0,
            default_hour: 12,
            trend_window: 5,
            trend_min_points: 3,
            trend_delta: 20.0,
        }
    }
}

/// Aggregate view of a reading history.
///
/// Averages are stored next to the number of samples they were computed from:
/// ratio rules need the sample count, which cannot be recovered from the mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSnapshot {
    /// Number of readings analyzed
    pub reading_count: usize,

    /// Mean of pre-meal readings, absent when there were none
    pub avg_pre_meal: Option<f64>,

    /// Number of pre-meal readings behind `avg_pre_meal`
    pub pre_meal_count: usize,

    /// Mean of post-meal readings, absent when there were none
    pub avg_post_meal: Option<f64>,

    /// Number of post-meal readings behind `avg_post_meal`
    pub post_meal_count: usize,

    /// Pre-meal or post-meal readings above their context threshold
    pub high_count: usize,

    /// Readings below the low threshold
    pub low_count: usize,

    /// Reading values grouped by hour of day (0-23)
    pub hour_buckets: BTreeMap<u32, Vec<f64>>,

    /// Trend over the trailing window
    pub trend: Trend,
}

impl PatternSnapshot {
    /// Mean of the readings taken during `hour`, if any
    pub fn hour_mean(&self, hour: u32) -> Option<f64> {
        self.hour_buckets.get(&hour).and_then(|values| mean(values))
    }

    /// Compact summary for API responses
    pub fn summary(&self) -> PatternSummary {
        PatternSummary {
            total_readings: self.reading_count,
            high_readings: self.high_count,
            low_readings: self.low_count,
            recent_trend: self.trend,
            avg_pre_meal: self.avg_pre_meal,
            avg_post_meal: self.avg_post_meal,
        }
    }
}

/// Serializable summary of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub total_readings: usize,
    pub high_readings: usize,
    pub low_readings: usize,
    pub recent_trend: Trend,
    pub avg_pre_meal: Option<f64>,
    pub avg_post_meal: Option<f64>,
}

/// Core pattern analysis engine
#[derive(Debug, Clone, Default)]
pub struct PatternAnalyzer {
    config: PatternConfig,
}

impl PatternAnalyzer {
    /// Create analyzer with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create analyzer with custom thresholds
    pub fn with_config(config: PatternConfig) -> Self {
        PatternAnalyzer { config }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Analyze a reading history.
    ///
    /// Returns `None` when fewer than `min_readings` readings are supplied;
    /// callers treat that as "no alerts, no predictions" rather than a failure.
    pub fn analyze(&self, readings: &[Reading]) -> Option<PatternSnapshot> {
        if readings.len() < self.config.min_readings {
            debug!(
                readings = readings.len(),
                required = self.config.min_readings,
                "Insufficient readings for pattern analysis"
            );
            return None;
        }

        let ordered = chronological(readings);

        let mut pre_meal = Vec::new();
        let mut post_meal = Vec::new();
        let mut high_count = 0;
        let mut low_count = 0;
        let mut hour_buckets: BTreeMap<u32, Vec<f64>> = BTreeMap::new();

        for reading in &ordered {
            let value = reading.value;

            match reading.context {
                MealContext::PreMeal => {
                    pre_meal.push(value);
                    if value > self.config.pre_meal_high {
                        high_count += 1;
                    }
                }
                MealContext::PostMeal => {
                    post_meal.push(value);
                    if value > self.config.post_meal_high {
                        high_count += 1;
                    }
                }
                _ => {}
            }

            if value < self.config.low_threshold {
                low_count += 1;
            }

            let hour = reading.hour().unwrap_or(self.config.default_hour);
            hour_buckets.entry(hour).or_default().push(value);
        }

        let values: Vec<f64> = ordered.iter().map(|r| r.value).collect();
        let trend = self.calculate_trend(&values);

        let snapshot = PatternSnapshot {
            reading_count: readings.len(),
            avg_pre_meal: mean(&pre_meal),
            pre_meal_count: pre_meal.len(),
            avg_post_meal: mean(&post_meal),
            post_meal_count: post_meal.len(),
            high_count,
            low_count,
            hour_buckets,
            trend,
        };

        debug!(
            readings = snapshot.reading_count,
            high = snapshot.high_count,
            low = snapshot.low_count,
            trend = ?snapshot.trend,
            "Pattern snapshot computed"
        );

        Some(snapshot)
    }

    /// Classify the trend of chronologically ordered values.
    ///
    /// Only the trailing window is inspected, and within it only the first and
    /// last value are compared.
    pub fn calculate_trend(&self, values: &[f64]) -> Trend {
        let start = values.len().saturating_sub(self.config.trend_window);
        let window = &values[start..];

        if window.len() < self.config.trend_min_points {
            return Trend::Stable;
        }

        let (Some(&first), Some(&last)) = (window.first(), window.last()) else {
            return Trend::Stable;
        };

        if last > first + self.config.trend_delta {
            Trend::Rising
        } else if last < first - self.config.trend_delta {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }
}

/// Analyze with default thresholds
pub fn analyze_patterns(readings: &[Reading]) -> Option<PatternSnapshot> {
    PatternAnalyzer::new().analyze(readings)
}

/// Readings ordered ascending by (date, time) without touching the caller's slice
pub fn chronological(readings: &[Reading]) -> Vec<&Reading> {
    let mut ordered: Vec<&Reading> = readings.iter().collect();
    ordered.sort_by_key(|r| r.sort_key());
    ordered
}

/// Readings dated from `today - days` through `today`, in input order
pub fn recent_readings(readings: &[Reading], today: NaiveDate, days: u64) -> Vec<Reading> {
    let start = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
    readings
        .iter()
        .filter(|r| r.date >= start && r.date <= today)
        .cloned()
        .collect()
}

/// Arithmetic mean, `None` for an empty slice
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

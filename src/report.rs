//! Dashboard report
//!
//! Bundles every component output for one user into a single JSON-serializable
//! document, and builds reports for many users in parallel.

use crate::alerts::{Alert, AlertGenerator};
use crate::challenges::{daily_challenges, DailyChallenge};
use crate::error::Result;
use crate::foods::{
    diet_recommendations, food_recommendations_by_status, foods_to_limit, StatusFoodGuide,
};
use crate::insights::{
    advice_for, education_for, personalized_insights, weekly_trend, GlucoseTrend, Insight,
    PersonalAdvice,
};
use crate::models::{
    BmiCategory, DiabetesType, Locale, MealContext, Reading, ReadingEvaluation, UserProfile,
};
use crate::patterns::{recent_readings, PatternAnalyzer, PatternSummary, ANALYSIS_WINDOW_DAYS};
use crate::predictions::{
    predict_food_impact_with_baseline, predict_for_meal, FoodImpactPrediction, MealPrediction,
    DEFAULT_POST_MEAL_BASELINE, MEAL_WINDOW_DAYS,
};
use crate::progress::{available_badges, evaluate_progress, BadgeListing, EarnedBadge, Progress};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// One user's records as supplied by the record store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub readings: Vec<Reading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub user_id: String,
    pub as_of: NaiveDate,
    pub locale: Locale,
    /// Absent when the history is too short to analyze
    pub patterns: Option<PatternSummary>,
    pub alerts: Vec<Alert>,
    pub meal_prediction: Option<MealPrediction>,
    /// Personal spike estimates for the high-impact catalog foods
    pub food_impacts: Vec<FoodImpactPrediction>,
    pub diet_recommendations: Vec<String>,
    pub progress: Progress,
    pub badges: Vec<EarnedBadge>,
    pub available_badges: Vec<BadgeListing>,
    pub challenges: Vec<DailyChallenge>,
    pub weekly_trend: GlucoseTrend,
    pub insights: Vec<Insight>,
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
    /// Status of the most recent reading
    pub latest_evaluation: Option<ReadingEvaluation>,
    pub food_guide: Option<StatusFoodGuide>,
    pub advice: PersonalAdvice,
    pub education: Vec<String>,
}

/// Builds dashboard reports with a fixed analyzer and alert configuration.
///
/// Patterns, alerts and food impacts look back `analysis_window_days`; the
/// meal prediction looks back `meal_window_days`. Progress, challenges and
/// insights use the full history.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    analyzer: PatternAnalyzer,
    alerts: AlertGenerator,
    default_diabetes_type: DiabetesType,
    analysis_window_days: u64,
    meal_window_days: u64,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self {
            analyzer: PatternAnalyzer::new(),
            alerts: AlertGenerator::new(),
            default_diabetes_type: DiabetesType::Type2,
            analysis_window_days: ANALYSIS_WINDOW_DAYS,
            meal_window_days: MEAL_WINDOW_DAYS,
        }
    }
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_analyzer(mut self, analyzer: PatternAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_alerts(mut self, alerts: AlertGenerator) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_default_diabetes_type(mut self, diabetes_type: DiabetesType) -> Self {
        self.default_diabetes_type = diabetes_type;
        self
    }

    /// Look-back windows in days, counted back from the report date
    pub fn with_windows(mut self, analysis_days: u64, meal_days: u64) -> Self {
        self.analysis_window_days = analysis_days;
        self.meal_window_days = meal_days;
        self
    }

    pub fn build(&self, user: &UserSnapshot, today: NaiveDate, locale: Locale) -> DashboardReport {
        let readings = &user.readings;
        let recent = recent_readings(readings, today, self.analysis_window_days);
        let meal_recent = recent_readings(readings, today, self.meal_window_days);
        let snapshot = self.analyzer.analyze(&recent);

        let baseline = snapshot
            .as_ref()
            .and_then(|s| s.avg_post_meal)
            .or(user.profile.avg_post_meal)
            .unwrap_or(DEFAULT_POST_MEAL_BASELINE);

        let food_impacts = foods_to_limit()
            .into_iter()
            .filter_map(|food| predict_food_impact_with_baseline(food.key, baseline, locale))
            .collect();

        let diabetes_type = user
            .profile
            .diabetes_type
            .unwrap_or(self.default_diabetes_type);

        let progress = evaluate_progress(readings, today, locale);
        let latest = readings.iter().max_by_key(|r| r.sort_key());

        let report = DashboardReport {
            user_id: user.user_id.clone(),
            as_of: today,
            locale,
            patterns: snapshot.as_ref().map(|s| s.summary()),
            alerts: self.alerts.generate(snapshot.as_ref(), locale),
            meal_prediction: predict_for_meal(&meal_recent, MealContext::PreMeal, locale),
            food_impacts,
            diet_recommendations: diet_recommendations(diabetes_type, locale),
            progress: progress.progress,
            badges: progress.badges,
            available_badges: available_badges(readings, locale),
            challenges: daily_challenges(readings, Some(today), locale),
            weekly_trend: weekly_trend(readings, today),
            insights: personalized_insights(readings, &user.profile, today, locale),
            bmi: user.profile.bmi(),
            bmi_category: user.profile.bmi_category(),
            latest_evaluation: latest.map(|r| r.evaluate(locale)),
            food_guide: latest.map(|r| food_recommendations_by_status(r.glucose_status())),
            advice: advice_for(&user.profile),
            education: education_for(user.profile.diabetes_type),
        };

        debug!(
            user = %report.user_id,
            analyzed = recent.len(),
            alerts = report.alerts.len(),
            insights = report.insights.len(),
            "Dashboard report built"
        );

        report
    }

    /// Build reports for many users in parallel. Output order matches input order.
    pub fn build_batch(
        &self,
        users: &[UserSnapshot],
        today: NaiveDate,
        locale: Locale,
    ) -> Vec<DashboardReport> {
        info!(users = users.len(), "Building dashboard reports");
        users
            .par_iter()
            .map(|user| self.build(user, today, locale))
            .collect()
    }
}

/// Build a report with default thresholds
pub fn build_report(user: &UserSnapshot, today: NaiveDate, locale: Locale) -> DashboardReport {
    ReportBuilder::new().build(user, today, locale)
}

/// Load user snapshots from a JSON array, or a single snapshot object
pub fn load_snapshots<P: AsRef<Path>>(path: P) -> Result<Vec<UserSnapshot>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Snapshots {
        Many(Vec<UserSnapshot>),
        One(UserSnapshot),
    }

    let reader = BufReader::new(File::open(path)?);
    let snapshots: Snapshots = serde_json::from_reader(reader)?;
    Ok(match snapshots {
        Snapshots::Many(users) => users,
        Snapshots::One(user) => vec![user],
    })
}

/// Export any serializable data structure as pretty JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

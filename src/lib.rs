// Library interface for glucors modules
// The CLI and integration tests drive the analytics through these exports

pub mod alerts;
pub mod challenges;
pub mod config;
pub mod error;
pub mod foods;
pub mod import;
pub mod insights;
pub mod logging;
pub mod models;
pub mod patterns;
pub mod predictions;
pub mod progress;
pub mod report;

// Re-export commonly used types for convenience
pub use models::*;
pub use alerts::{generate_alerts, Alert, AlertConfig, AlertGenerator, AlertKind};
pub use challenges::{daily_challenges, ChallengeId, ChallengeStatus, DailyChallenge};
pub use foods::{find_food, food_recommendations_by_status, FoodEntry, ImpactTier, StatusFoodGuide};
pub use insights::{advice_for, education_for, PersonalAdvice};
pub use patterns::{
    analyze_patterns, recent_readings, PatternAnalyzer, PatternConfig, PatternSnapshot, Trend,
};
pub use predictions::{predict_food_impact, predict_for_meal, FoodImpactPrediction, MealPrediction};
pub use progress::{evaluate_progress, BadgeId, LevelInfo, Progress};
pub use report::{build_report, DashboardReport, ReportBuilder, UserSnapshot};
pub use error::{GlucorsError, ImportError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};

//! Food impact and meal-context predictions
//!
//! Estimates how far a catalog food will push blood glucose above the user's
//! usual post-meal level, and flags meals whose lead-in readings are already
//! running high.

use crate::error::{GlucorsError, Result};
use crate::foods::{find_food, ImpactTier};
use crate::models::{Locale, LocalizedList, LocalizedText, MealContext, Reading};
use crate::patterns::{mean, PatternSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Post-meal baseline assumed when the user has no post-meal history (mg/dL)
pub const DEFAULT_POST_MEAL_BASELINE: f64 = 150.0;

/// Pre-meal average above which the next meal should be lighter (mg/dL)
const PRE_MEAL_CAUTION: f64 = 130.0;

/// Days of history behind a meal prediction
pub const MEAL_WINDOW_DAYS: u64 = 14;

/// Readings needed in one context before a meal prediction is made
const MEAL_PREDICTION_MIN_READINGS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodImpactPrediction {
    /// Catalog key the name resolved to
    pub food_key: String,
    /// Localized food name
    pub food: String,
    pub glucose_impact: ImpactTier,
    /// Expected rise above the post-meal baseline (mg/dL)
    pub estimated_spike: f64,
    pub recommendations: Vec<String>,
}

/// Expected spike for an impact tier given the user's post-meal baseline.
///
/// Higher-impact foods scale with how far the user's baseline sits from
/// the population default; low-impact foods are flat.
pub fn estimated_spike(tier: ImpactTier, baseline: f64) -> f64 {
    let deviation = baseline - DEFAULT_POST_MEAL_BASELINE;
    match tier {
        ImpactTier::VeryHigh => 80.0 + deviation * 0.3,
        ImpactTier::High => 50.0 + deviation * 0.2,
        ImpactTier::Medium => 30.0 + deviation * 0.1,
        ImpactTier::Low => 15.0,
        ImpactTier::None => 0.0,
    }
}

/// Predict the impact of a named food using the snapshot's post-meal average
/// as the baseline. Returns `None` when the food is not in the catalog.
pub fn predict_food_impact(
    food_name: &str,
    snapshot: Option<&PatternSnapshot>,
    locale: Locale,
) -> Option<FoodImpactPrediction> {
    let baseline = snapshot
        .and_then(|s| s.avg_post_meal)
        .unwrap_or(DEFAULT_POST_MEAL_BASELINE);
    predict_food_impact_with_baseline(food_name, baseline, locale)
}

/// Predict the impact of a named food against an explicit baseline
pub fn predict_food_impact_with_baseline(
    food_name: &str,
    baseline: f64,
    locale: Locale,
) -> Option<FoodImpactPrediction> {
    let Some(food) = find_food(food_name) else {
        debug!(food = food_name, "Food not found in catalog");
        return None;
    };

    let spike = estimated_spike(food.impact, baseline);
    debug!(
        food = food.key,
        impact = ?food.impact,
        baseline,
        spike,
        "Food impact predicted"
    );

    Some(FoodImpactPrediction {
        food_key: food.key.to_string(),
        food: food.name.get(locale).to_string(),
        glucose_impact: food.impact,
        estimated_spike: spike,
        recommendations: food.tips.get(locale),
    })
}

/// Like [`predict_food_impact`] but reports a missing food as an error
pub fn predict_food_impact_or_err(
    food_name: &str,
    snapshot: Option<&PatternSnapshot>,
    locale: Locale,
) -> Result<FoodImpactPrediction> {
    predict_food_impact(food_name, snapshot, locale).ok_or_else(|| GlucorsError::FoodNotFound {
        name: food_name.to_string(),
    })
}

/// Advice for an upcoming meal based on earlier readings in the same context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPrediction {
    #[serde(rename = "type")]
    pub kind: String,
    pub context: MealContext,
    /// Mean of the readings the prediction is based on (mg/dL)
    pub average: f64,
    pub message: String,
    pub food_suggestions: Vec<String>,
}

// {value} is replaced with the context average
static LIGHTER_MEAL_MESSAGE: LocalizedText = LocalizedText::new(
    "Your pre-meal readings usually average {value}. Consider a lighter meal today.",
    "Vipimo vyako kabla ya chakula kawaida ni wastani wa {value}. Fikiria chakula kizito kidogo leo.",
);

static LIGHTER_MEAL_FOODS: LocalizedList = LocalizedList::new(
    &[
        "Choose sukuma wiki over ugali",
        "Add protein like nyama choma",
        "Drink water before eating",
    ],
    &[
        "Chagua sukuma wiki badala ya ugali",
        "Ongeza protini kama nyama choma",
        "Kunywa maji kabla ya kula",
    ],
);

/// Predict how the next meal in `context` is likely to go.
///
/// At most one prediction is returned: only pre-meal readings averaging above
/// 130 mg/dL over at least three samples produce advice.
pub fn predict_for_meal(
    readings: &[Reading],
    context: MealContext,
    locale: Locale,
) -> Option<MealPrediction> {
    let values: Vec<f64> = readings
        .iter()
        .filter(|r| r.context == context)
        .map(|r| r.value)
        .collect();

    if values.len() < MEAL_PREDICTION_MIN_READINGS {
        return None;
    }

    let average = mean(&values)?;
    if context != MealContext::PreMeal || average <= PRE_MEAL_CAUTION {
        return None;
    }

    info!(context = %context, average, "Meal prediction generated");

    Some(MealPrediction {
        kind: "meal_prediction".to_string(),
        context,
        average,
        message: LIGHTER_MEAL_MESSAGE
            .get(locale)
            .replace("{value}", &format!("{:.1}", average)),
        food_suggestions: LIGHTER_MEAL_FOODS.get(locale),
    })
}

//! Educational insights
//!
//! Combines the latest reading's clinical status, the user's BMI category and
//! the weekly glucose trend into a short, prioritized list of tips with local
//! Kenyan context.

use crate::models::{
    BmiCategory, DiabetesType, GlucoseStatus, Locale, LocalizedText, Reading, Severity,
    UserProfile,
};
use crate::patterns::mean;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::debug;

/// Days before `today` included in the weekly trend
pub const TREND_WINDOW_DAYS: u64 = 7;

/// Readings averaged at each end of the weekly window
const TREND_SAMPLE: usize = 3;

/// Shift in mg/dL between the newest and oldest samples that counts as a trend
const TREND_DELTA: f64 = 20.0;

/// Insights returned to the user
pub const MAX_INSIGHTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeeklyTrend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlucoseTrend {
    pub trend: WeeklyTrend,
    /// Mean of the window, rounded to one decimal
    pub average: Option<f64>,
    pub readings_count: usize,
    pub latest_reading: Option<Reading>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Readings newest first by (date, time)
fn newest_first(readings: &[Reading]) -> Vec<&Reading> {
    let mut ordered: Vec<&Reading> = readings.iter().collect();
    ordered.sort_by_key(|r| Reverse(r.sort_key()));
    ordered
}

/// Compare the newest and oldest readings of the last week
pub fn weekly_trend(readings: &[Reading], today: NaiveDate) -> GlucoseTrend {
    let start = today
        .checked_sub_days(Days::new(TREND_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let window: Vec<&Reading> = newest_first(readings)
        .into_iter()
        .filter(|r| r.date >= start && r.date <= today)
        .collect();

    let values: Vec<f64> = window.iter().map(|r| r.value).collect();
    let Some(average) = mean(&values) else {
        return GlucoseTrend {
            trend: WeeklyTrend::NoData,
            average: None,
            readings_count: 0,
            latest_reading: None,
        };
    };

    let trend = if values.len() < TREND_SAMPLE {
        WeeklyTrend::InsufficientData
    } else {
        let recent = mean(&values[..TREND_SAMPLE]).unwrap_or(average);
        let older = mean(&values[values.len() - TREND_SAMPLE..]).unwrap_or(average);
        if recent > older + TREND_DELTA {
            WeeklyTrend::Increasing
        } else if recent < older - TREND_DELTA {
            WeeklyTrend::Decreasing
        } else {
            WeeklyTrend::Stable
        }
    };

    GlucoseTrend {
        trend,
        average: Some(round1(average)),
        readings_count: values.len(),
        latest_reading: window.first().map(|r| (*r).clone()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Food,
    General,
    Exercise,
    Emergency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub content: String,
    pub category: InsightCategory,
    pub local_relevance: bool,
    pub priority: Severity,
}

struct Tip {
    title: LocalizedText,
    content: LocalizedText,
    category: InsightCategory,
    local_relevance: bool,
    priority: Severity,
}

impl Tip {
    fn to_insight(&self, locale: Locale) -> Insight {
        Insight {
            title: self.title.get(locale).to_string(),
            content: self.content.get(locale).to_string(),
            category: self.category,
            local_relevance: self.local_relevance,
            priority: self.priority,
        }
    }
}

static HIGH_GLUCOSE_TIPS: [Tip; 3] = [
    Tip {
        title: LocalizedText::english("Managing High Blood Sugar with Local Foods"),
        content: LocalizedText::english(
            "When your blood sugar is high, focus on low-carb Kenyan foods like sukuma wiki (kale), spinach, and cabbage. Avoid ugali, rice, and chapati temporarily. Drink plenty of water and consider a short walk.",
        ),
        category: InsightCategory::Food,
        local_relevance: true,
        priority: Severity::High,
    },
    Tip {
        title: LocalizedText::english("Kenyan Herbs for Blood Sugar"),
        content: LocalizedText::english(
            "Traditional Kenyan herbs like bitter leaf (mululuza) and neem leaves can help manage blood sugar. Consult your doctor before using herbal remedies alongside your medication.",
        ),
        category: InsightCategory::General,
        local_relevance: true,
        priority: Severity::Medium,
    },
    Tip {
        title: LocalizedText::english("Exercise with High Blood Sugar"),
        content: LocalizedText::english(
            "Light exercise like walking around your compound or doing household chores can help lower blood sugar. Avoid intense exercise when glucose is very high (>300 mg/dL).",
        ),
        category: InsightCategory::Exercise,
        local_relevance: false,
        priority: Severity::High,
    },
];

static LOW_GLUCOSE_TIPS: [Tip; 2] = [
    Tip {
        title: LocalizedText::english("Quick Treatment for Low Blood Sugar"),
        content: LocalizedText::english(
            "For low blood sugar, quickly consume 15g of fast-acting carbs: 3-4 glucose tablets, 1 tablespoon honey, or 1/2 cup fruit juice. Wait 15 minutes and recheck your levels.",
        ),
        category: InsightCategory::Emergency,
        local_relevance: false,
        priority: Severity::High,
    },
    Tip {
        title: LocalizedText::english("Kenyan Foods for Low Blood Sugar"),
        content: LocalizedText::english(
            "Keep these Kenyan foods handy for low blood sugar: ripe bananas, passion fruit juice, or a small piece of sugarcane. Follow up with protein like groundnuts or boiled eggs.",
        ),
        category: InsightCategory::Food,
        local_relevance: true,
        priority: Severity::High,
    },
];

static NORMAL_GLUCOSE_TIPS: [Tip; 2] = [
    Tip {
        title: LocalizedText::english("Maintaining Good Control with Kenyan Diet"),
        content: LocalizedText::english(
            "Great job! Maintain your levels with balanced Kenyan meals: combine ugali/rice with plenty of vegetables (sukuma wiki, cabbage), lean protein (fish, chicken, beans), and limit portion sizes.",
        ),
        category: InsightCategory::Food,
        local_relevance: true,
        priority: Severity::Medium,
    },
    Tip {
        title: LocalizedText::english("Hydration in Kenyan Climate"),
        content: LocalizedText::english(
            "In Kenya's climate, stay well hydrated with water. Avoid sugary drinks like soda. Coconut water is a good natural option for hydration.",
        ),
        category: InsightCategory::General,
        local_relevance: true,
        priority: Severity::Medium,
    },
];

static UNDERWEIGHT_TIPS: [Tip; 1] = [Tip {
    title: LocalizedText::english("Healthy Weight Gain for Diabetics"),
    content: LocalizedText::english(
        "Focus on nutrient-dense Kenyan foods: avocados, groundnuts, sweet potatoes, and lean proteins. Eat frequent small meals and consult your doctor about adjusting diabetes medication.",
    ),
    category: InsightCategory::Food,
    local_relevance: true,
    priority: Severity::Medium,
}];

static OVERWEIGHT_TIPS: [Tip; 1] = [Tip {
    title: LocalizedText::english("Weight Management with Kenyan Foods"),
    content: LocalizedText::english(
        "Focus on vegetables like sukuma wiki, spinach, and cabbage. Choose smaller portions of ugali/rice. Include proteins like fish, beans, and chicken. Avoid fried foods and sugary drinks.",
    ),
    category: InsightCategory::Food,
    local_relevance: true,
    priority: Severity::High,
}];

static OBESE_TIPS: [Tip; 1] = [Tip {
    title: LocalizedText::english("Diabetes and Weight Loss in Kenya"),
    content: LocalizedText::english(
        "Work with your doctor on a weight loss plan. Focus on vegetables, lean proteins, and controlled portions. Consider joining community walking groups or local fitness activities.",
    ),
    category: InsightCategory::Exercise,
    local_relevance: true,
    priority: Severity::High,
}];

fn status_tips(status: GlucoseStatus) -> &'static [Tip] {
    match status {
        GlucoseStatus::Low => &LOW_GLUCOSE_TIPS,
        GlucoseStatus::Normal => &NORMAL_GLUCOSE_TIPS,
        GlucoseStatus::Prediabetic | GlucoseStatus::Elevated | GlucoseStatus::High => {
            &HIGH_GLUCOSE_TIPS
        }
    }
}

fn bmi_tips(category: BmiCategory) -> &'static [Tip] {
    match category {
        BmiCategory::Underweight => &UNDERWEIGHT_TIPS,
        BmiCategory::Normal => &[],
        BmiCategory::Overweight => &OVERWEIGHT_TIPS,
        BmiCategory::Obese => &OBESE_TIPS,
    }
}

fn trend_insight(trend: &GlucoseTrend) -> Option<Insight> {
    let average = trend.average?;
    match trend.trend {
        WeeklyTrend::Increasing => Some(Insight {
            title: "Rising Blood Sugar Trend Detected".to_string(),
            content: format!(
                "Your average blood sugar has been increasing over the past week (current average: {:.1} mg/dL). Review your diet, medication timing, and stress levels. Contact your doctor if this continues.",
                average
            ),
            category: InsightCategory::General,
            local_relevance: false,
            priority: Severity::High,
        }),
        WeeklyTrend::Decreasing => Some(Insight {
            title: "Improving Blood Sugar Control".to_string(),
            content: format!(
                "Great progress! Your blood sugar trend is improving (current average: {:.1} mg/dL). Keep up your current routine and continue monitoring regularly.",
                average
            ),
            category: InsightCategory::General,
            local_relevance: false,
            priority: Severity::Medium,
        }),
        _ => None,
    }
}

/// Up to five tips ordered high > medium > low, ties kept in table order
pub fn personalized_insights(
    readings: &[Reading],
    profile: &UserProfile,
    today: NaiveDate,
    locale: Locale,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(latest) = newest_first(readings).first() {
        let status = latest.glucose_status();
        debug!(?status, value = latest.value, "Latest reading status");
        insights.extend(status_tips(status).iter().map(|tip| tip.to_insight(locale)));
    }

    if let Some(category) = profile.bmi_category() {
        insights.extend(bmi_tips(category).iter().map(|tip| tip.to_insight(locale)));
    }

    let trend = weekly_trend(readings, today);
    insights.extend(trend_insight(&trend));

    // sort_by_key is stable
    insights.sort_by_key(|insight| Reverse(insight.priority));
    insights.truncate(MAX_INSIGHTS);
    insights
}

/// Background reading on the user's diabetes type. Empty when no type is declared.
pub fn education_for(diabetes_type: Option<DiabetesType>) -> Vec<String> {
    let lines: &[&str] = match diabetes_type {
        Some(DiabetesType::Type1) => &[
            "Type 1 diabetes: autoimmune; requires insulin therapy.",
            "Monitor carbs and time insulin with meals.",
            "Carry fast-acting glucose to treat lows.",
        ],
        Some(DiabetesType::Type2) => &[
            "Type 2 diabetes: insulin resistance; lifestyle and meds help.",
            "Focus on weight management, low-GI carbs, regular activity.",
            "Monitor blood sugar trends and medication adherence.",
        ],
        Some(DiabetesType::Gestational) => &[
            "Gestational diabetes: occurs in pregnancy; close monitoring.",
            "Follow meal plan, stay active, and track sugars as advised.",
        ],
        Some(DiabetesType::Prediabetes) => &[
            "Prediabetes: elevated sugars; lifestyle changes are effective.",
            "Aim for 150+ minutes weekly activity and balanced meals.",
        ],
        None => &[],
    };
    lines.iter().map(|s| s.to_string()).collect()
}

/// Nutrition, exercise and medication advice for a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalAdvice {
    pub nutrition: Vec<String>,
    pub exercise: Vec<String>,
    pub medication: Vec<String>,
    pub bmi_category: Option<BmiCategory>,
}

struct AdviceLines {
    nutrition: &'static [&'static str],
    exercise: &'static [&'static str],
    medication: &'static [&'static str],
}

static BASE_ADVICE: AdviceLines = AdviceLines {
    nutrition: &[
        "Prioritize whole foods: vegetables, lean proteins, healthy fats.",
        "Choose low-glycemic carbs and adequate fiber.",
        "Balance plates: half non-starchy veg, quarter protein, quarter carbs.",
    ],
    exercise: &[
        "Aim for 150+ minutes/week of moderate activity (e.g., brisk walking).",
        "Add 2-3 days/week of resistance training if able.",
        "Light movement after meals (10-15 min) can help post-meal glucose.",
    ],
    medication: &[
        "Take medications exactly as prescribed.",
        "Discuss changes or side effects with your clinician.",
        "Never adjust insulin/meds without medical guidance.",
    ],
};

fn type_advice(diabetes_type: DiabetesType) -> AdviceLines {
    match diabetes_type {
        DiabetesType::Type1 => AdviceLines {
            nutrition: &["Count carbohydrates and match insulin appropriately."],
            exercise: &["Monitor glucose before/after exercise; carry fast-acting carbs."],
            medication: &[
                "Review basal/bolus strategy and correction factors with your care team.",
            ],
        },
        DiabetesType::Type2 => AdviceLines {
            nutrition: &["Focus on weight management and portion control."],
            exercise: &["Build consistency; short daily walks are very effective."],
            medication: &[
                "Metformin adherence and timing can matter; ask about alternatives if GI side effects.",
            ],
        },
        DiabetesType::Gestational => AdviceLines {
            nutrition: &["Follow pregnancy meal plan and carb targets from your clinician."],
            exercise: &["Prefer low-impact activity as approved by your provider."],
            medication: &["Frequent monitoring and close coordination with your obstetric team."],
        },
        DiabetesType::Prediabetes => AdviceLines {
            nutrition: &["Reduce sugary drinks and refined carbs; emphasize fiber."],
            exercise: &["Accumulate movement throughout the day; aim for daily consistency."],
            medication: &["Lifestyle changes are first-line; discuss medication only if advised."],
        },
    }
}

fn bmi_advice(category: BmiCategory) -> AdviceLines {
    match category {
        BmiCategory::Underweight => AdviceLines {
            nutrition: &[
                "Ensure adequate calories and protein; seek a dietitian if losing weight unintentionally.",
            ],
            exercise: &[],
            medication: &[],
        },
        BmiCategory::Normal => AdviceLines {
            nutrition: &[],
            exercise: &[],
            medication: &[],
        },
        BmiCategory::Overweight => AdviceLines {
            nutrition: &[
                "Create a modest calorie deficit; consider smaller plates and mindful eating.",
            ],
            exercise: &["Start gently and build up duration; track steps to motivate progress."],
            medication: &[],
        },
        BmiCategory::Obese => AdviceLines {
            nutrition: &[
                "Work with your clinician on a structured weight-loss plan; consider dietitian support.",
            ],
            exercise: &[
                "Low-impact options (walking, cycling, swimming) reduce joint stress; progress gradually.",
            ],
            medication: &[],
        },
    }
}

/// General advice, extended by diabetes type and then by BMI category
pub fn advice_for(profile: &UserProfile) -> PersonalAdvice {
    let bmi_category = profile.bmi_category();
    let layers: Vec<AdviceLines> = profile
        .diabetes_type
        .map(type_advice)
        .into_iter()
        .chain(bmi_category.map(bmi_advice))
        .collect();

    let gather = |pick: fn(&AdviceLines) -> &'static [&'static str]| -> Vec<String> {
        std::iter::once(&BASE_ADVICE)
            .chain(layers.iter())
            .flat_map(|lines| pick(lines).iter().map(|s| s.to_string()))
            .collect()
    };

    PersonalAdvice {
        nutrition: gather(|l| l.nutrition),
        exercise: gather(|l| l.exercise),
        medication: gather(|l| l.medication),
        bmi_category,
    }
}

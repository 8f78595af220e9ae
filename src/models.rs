use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Meal-relative timing of a glucose reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealContext {
    PreMeal,
    PostMeal,
    Fasting,
    Bedtime,
    Random,
    /// No context recorded (or an unrecognised label from the record store)
    #[default]
    #[serde(other)]
    None,
}

impl MealContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealContext::PreMeal => "pre_meal",
            MealContext::PostMeal => "post_meal",
            MealContext::Fasting => "fasting",
            MealContext::Bedtime => "bedtime",
            MealContext::Random => "random",
            MealContext::None => "none",
        }
    }
}

impl FromStr for MealContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "pre_meal" | "premeal" | "before_meal" => Ok(MealContext::PreMeal),
            "post_meal" | "postmeal" | "after_meal" => Ok(MealContext::PostMeal),
            "fasting" => Ok(MealContext::Fasting),
            "bedtime" => Ok(MealContext::Bedtime),
            "random" => Ok(MealContext::Random),
            "" | "none" => Ok(MealContext::None),
            other => Err(format!("Invalid meal context: {}", other)),
        }
    }
}

impl fmt::Display for MealContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output language. Unknown codes resolve to English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Locale {
    #[default]
    En,
    Sw,
}

impl Locale {
    /// Resolve a locale code, falling back to English for anything unsupported
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "en" => Locale::En,
            "sw" => Locale::Sw,
            other => {
                tracing::debug!(locale = other, "Unsupported locale, falling back to en");
                Locale::En
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Sw => "sw",
        }
    }
}

impl From<String> for Locale {
    fn from(code: String) -> Self {
        Locale::from_code(&code)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.as_str().to_string()
    }
}

impl FromStr for Locale {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Locale::from_code(s))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static catalog text in English with an optional Swahili translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalizedText {
    en: &'static str,
    sw: Option<&'static str>,
}

impl LocalizedText {
    pub const fn new(en: &'static str, sw: &'static str) -> Self {
        Self { en, sw: Some(sw) }
    }

    /// Text that has not been translated yet
    pub const fn english(en: &'static str) -> Self {
        Self { en, sw: None }
    }

    pub fn get(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.en,
            Locale::Sw => self.sw.unwrap_or(self.en),
        }
    }
}

/// Static list of catalog strings per locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalizedList {
    en: &'static [&'static str],
    sw: Option<&'static [&'static str]>,
}

impl LocalizedList {
    pub const fn new(en: &'static [&'static str], sw: &'static [&'static str]) -> Self {
        Self { en, sw: Some(sw) }
    }

    /// List that has not been translated yet
    pub const fn english(en: &'static [&'static str]) -> Self {
        Self { en, sw: None }
    }

    pub fn get(&self, locale: Locale) -> Vec<String> {
        let items = match locale {
            Locale::En => self.en,
            Locale::Sw => self.sw.unwrap_or(self.en),
        };
        items.iter().map(|s| s.to_string()).collect()
    }
}

/// Severity / priority ordering shared by alerts and insights
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Single blood glucose measurement supplied by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Blood glucose in mg/dL
    pub value: f64,

    /// Calendar date of the measurement
    pub date: NaiveDate,

    /// Time of day, when the meter or user recorded one
    #[serde(default, with = "clock_time")]
    pub time: Option<NaiveTime>,

    /// Meal-relative timing
    #[serde(default, deserialize_with = "context_or_none")]
    pub context: MealContext,

    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl Reading {
    pub fn new(value: f64, date: NaiveDate) -> Self {
        Self {
            value,
            date,
            time: None,
            context: MealContext::None,
            notes: None,
        }
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_context(mut self, context: MealContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Hour of day, if a time was recorded
    pub fn hour(&self) -> Option<u32> {
        self.time.map(|t| t.hour())
    }

    /// Chronological ordering key. Readings without a time sort first within their day.
    pub fn sort_key(&self) -> (NaiveDate, Option<NaiveTime>) {
        (self.date, self.time)
    }

    /// Classify the reading against context-specific clinical ranges
    pub fn glucose_status(&self) -> GlucoseStatus {
        let v = self.value;
        if v < 70.0 {
            return GlucoseStatus::Low;
        }

        match self.context {
            MealContext::Fasting => {
                if v <= 100.0 {
                    GlucoseStatus::Normal
                } else if v <= 125.0 {
                    GlucoseStatus::Prediabetic
                } else {
                    GlucoseStatus::High
                }
            }
            MealContext::PostMeal => {
                if v <= 140.0 {
                    GlucoseStatus::Normal
                } else if v <= 199.0 {
                    GlucoseStatus::Prediabetic
                } else {
                    GlucoseStatus::High
                }
            }
            _ => {
                if v <= 130.0 {
                    GlucoseStatus::Normal
                } else if v <= 180.0 {
                    GlucoseStatus::Elevated
                } else {
                    GlucoseStatus::High
                }
            }
        }
    }

    /// Quick feedback shown when a reading is logged.
    ///
    /// Pre-meal readings are judged against an 80-130 mg/dL band. Every other
    /// context uses the post-meal ceiling of 180 mg/dL and never reports low.
    pub fn evaluate(&self, locale: Locale) -> ReadingEvaluation {
        let v = self.value;
        let (status, color, tips) = match self.context {
            MealContext::PreMeal if v > PRE_MEAL_TARGET_HIGH => {
                (GlucoseStatus::High, StatusColor::Red, &EVALUATION_TIPS_HIGH)
            }
            MealContext::PreMeal if v >= PRE_MEAL_TARGET_LOW => {
                (GlucoseStatus::Normal, StatusColor::Green, &EVALUATION_TIPS_NORMAL)
            }
            MealContext::PreMeal => (GlucoseStatus::Low, StatusColor::Yellow, &EVALUATION_TIPS_LOW),
            _ if v < POST_MEAL_TARGET_HIGH => {
                (GlucoseStatus::Normal, StatusColor::Green, &EVALUATION_TIPS_NORMAL)
            }
            _ => (GlucoseStatus::High, StatusColor::Red, &EVALUATION_TIPS_HIGH),
        };

        ReadingEvaluation {
            status,
            color,
            suggestions: tips.get(locale),
        }
    }
}

const PRE_MEAL_TARGET_LOW: f64 = 80.0;
const PRE_MEAL_TARGET_HIGH: f64 = 130.0;
const POST_MEAL_TARGET_HIGH: f64 = 180.0;

static EVALUATION_TIPS_NORMAL: LocalizedList = LocalizedList::english(&[
    "Maintain balanced meals with non-starchy veggies, lean protein, and healthy fats.",
    "Stay hydrated and keep up light daily activity.",
    "Aim for consistent meal times and portion control.",
]);

static EVALUATION_TIPS_HIGH: LocalizedList = LocalizedList::english(&[
    "Take a 15-30 minute walk and hydrate with water.",
    "Reduce refined carbohydrates; choose low-GI, high-fiber foods.",
    "Include lean proteins and healthy fats to slow glucose spikes.",
    "Discuss supplements with your doctor (e.g., cinnamon, berberine).",
]);

static EVALUATION_TIPS_LOW: LocalizedList = LocalizedList::english(&[
    "Consider a small balanced snack and consult your clinician if frequent.",
]);

/// Indicator color for an evaluated reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
}

/// Result of [`Reading::evaluate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingEvaluation {
    /// One of low, normal or high
    pub status: GlucoseStatus,
    pub color: StatusColor,
    pub suggestions: Vec<String>,
}

/// Parse a time of day in `HH:MM` or `HH:MM:SS` form
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    const FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
}

fn context_or_none<'de, D>(deserializer: D) -> Result<MealContext, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<MealContext>::deserialize(deserializer)?.unwrap_or_default())
}

// Times travel as "HH:MM" strings, matching what the record store emits
mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_time_of_day(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day: {}", s))),
        }
    }
}

/// Clinical classification of a single reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlucoseStatus {
    Low,
    Normal,
    Prediabetic,
    Elevated,
    High,
}

/// Declared diabetes type from the user's profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiabetesType {
    Type1,
    Type2,
    Gestational,
    Prediabetes,
}

impl FromStr for DiabetesType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "type1" | "t1" => Ok(DiabetesType::Type1),
            "type2" | "t2" => Ok(DiabetesType::Type2),
            "gestational" => Ok(DiabetesType::Gestational),
            "prediabetes" | "prediabetic" => Ok(DiabetesType::Prediabetes),
            _ => Err(format!("Invalid diabetes type: {}", s)),
        }
    }
}

impl fmt::Display for DiabetesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiabetesType::Type1 => "type1",
            DiabetesType::Type2 => "type2",
            DiabetesType::Gestational => "gestational",
            DiabetesType::Prediabetes => "prediabetes",
        };
        f.write_str(label)
    }
}

/// WHO body-mass-index category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

/// User attributes the record store supplies alongside readings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Declared diabetes type
    pub diabetes_type: Option<DiabetesType>,

    /// Height in centimeters
    pub height_cm: Option<f64>,

    /// Weight in kilograms
    pub weight_kg: Option<f64>,

    /// Declared average post-meal glucose (mg/dL), used when history is too short
    pub avg_post_meal: Option<f64>,
}

impl UserProfile {
    /// Body mass index rounded to one decimal
    pub fn bmi(&self) -> Option<f64> {
        match (self.weight_kg, self.height_cm) {
            (Some(weight), Some(height)) if weight > 0.0 && height > 0.0 => {
                let height_m = height / 100.0;
                Some((weight / (height_m * height_m) * 10.0).round() / 10.0)
            }
            _ => None,
        }
    }

    pub fn bmi_category(&self) -> Option<BmiCategory> {
        self.bmi().map(BmiCategory::from_bmi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_locale_fallback() {
        assert_eq!(Locale::from_code("sw"), Locale::Sw);
        assert_eq!(Locale::from_code("EN"), Locale::En);
        assert_eq!(Locale::from_code("fr"), Locale::En);
        assert_eq!("".parse::<Locale>().unwrap(), Locale::En);
    }

    #[test]
    fn test_locale_serde() {
        let locale: Locale = serde_json::from_str("\"fr\"").unwrap();
        assert_eq!(locale, Locale::En);
        assert_eq!(serde_json::to_string(&Locale::Sw).unwrap(), "\"sw\"");
    }

    #[test]
    fn test_localized_text_fallback() {
        let text = LocalizedText::english("Only English");
        assert_eq!(text.get(Locale::Sw), "Only English");

        let text = LocalizedText::new("Beginner", "Mwanzo");
        assert_eq!(text.get(Locale::Sw), "Mwanzo");
        assert_eq!(text.get(Locale::En), "Beginner");
    }

    #[test]
    fn test_meal_context_parsing() {
        assert_eq!("pre_meal".parse::<MealContext>().unwrap(), MealContext::PreMeal);
        assert_eq!("Post Meal".parse::<MealContext>().unwrap(), MealContext::PostMeal);
        assert_eq!("".parse::<MealContext>().unwrap(), MealContext::None);
        assert!("brunch".parse::<MealContext>().is_err());
    }

    #[test]
    fn test_reading_json() {
        let json = r#"{"value": 142.5, "date": "2024-03-10", "time": "08:15", "context": "pre_meal"}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.value, 142.5);
        assert_eq!(reading.hour(), Some(8));
        assert_eq!(reading.context, MealContext::PreMeal);
        assert!(reading.notes.is_none());

        let json = r#"{"value": 99, "date": "2024-03-10", "time": null, "context": null}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.time, None);
        assert_eq!(reading.context, MealContext::None);

        let json = r#"{"value": 99, "date": "2024-03-10", "context": "snack"}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.context, MealContext::None);
    }

    #[test]
    fn test_glucose_status() {
        let fasting = |v| Reading::new(v, date()).with_context(MealContext::Fasting);
        assert_eq!(fasting(65.0).glucose_status(), GlucoseStatus::Low);
        assert_eq!(fasting(95.0).glucose_status(), GlucoseStatus::Normal);
        assert_eq!(fasting(110.0).glucose_status(), GlucoseStatus::Prediabetic);
        assert_eq!(fasting(130.0).glucose_status(), GlucoseStatus::High);

        let post = |v| Reading::new(v, date()).with_context(MealContext::PostMeal);
        assert_eq!(post(140.0).glucose_status(), GlucoseStatus::Normal);
        assert_eq!(post(199.0).glucose_status(), GlucoseStatus::Prediabetic);
        assert_eq!(post(200.0).glucose_status(), GlucoseStatus::High);

        let random = |v| Reading::new(v, date());
        assert_eq!(random(130.0).glucose_status(), GlucoseStatus::Normal);
        assert_eq!(random(150.0).glucose_status(), GlucoseStatus::Elevated);
        assert_eq!(random(181.0).glucose_status(), GlucoseStatus::High);
    }

    #[test]
    fn test_evaluate_pre_meal_band() {
        let pre = |v| Reading::new(v, date()).with_context(MealContext::PreMeal);

        let eval = pre(80.0).evaluate(Locale::En);
        assert_eq!(eval.status, GlucoseStatus::Normal);
        assert_eq!(eval.color, StatusColor::Green);
        assert_eq!(eval.suggestions.len(), 3);

        let eval = pre(131.0).evaluate(Locale::En);
        assert_eq!(eval.status, GlucoseStatus::High);
        assert_eq!(eval.color, StatusColor::Red);
        assert_eq!(eval.suggestions.len(), 4);

        let eval = pre(79.0).evaluate(Locale::Sw);
        assert_eq!(eval.status, GlucoseStatus::Low);
        assert_eq!(eval.color, StatusColor::Yellow);
        assert!(eval.suggestions[0].starts_with("Consider a small balanced snack"));
    }

    #[test]
    fn test_evaluate_other_contexts() {
        let post = Reading::new(179.0, date()).with_context(MealContext::PostMeal);
        assert_eq!(post.evaluate(Locale::En).status, GlucoseStatus::Normal);

        let post = Reading::new(180.0, date()).with_context(MealContext::PostMeal);
        assert_eq!(post.evaluate(Locale::En).status, GlucoseStatus::High);

        // no low band outside pre-meal
        let untagged = Reading::new(55.0, date());
        let eval = untagged.evaluate(Locale::En);
        assert_eq!(eval.status, GlucoseStatus::Normal);

        let json = serde_json::to_value(&eval).unwrap();
        assert_eq!(json["status"], "normal");
        assert_eq!(json["color"], "green");
    }

    #[test]
    fn test_bmi() {
        let profile = UserProfile {
            height_cm: Some(170.0),
            weight_kg: Some(85.0),
            ..UserProfile::default()
        };
        assert_eq!(profile.bmi(), Some(29.4));
        assert_eq!(profile.bmi_category(), Some(BmiCategory::Overweight));

        assert_eq!(UserProfile::default().bmi(), None);
        assert_eq!(BmiCategory::from_bmi(17.0), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(31.0), BmiCategory::Obese);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }
}

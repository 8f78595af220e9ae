//! Predictive glucose alerts
//!
//! Alerts are produced from a [`PatternSnapshot`] by an ordered rule table.
//! Every rule is evaluated independently; several alerts may fire at once and
//! they are always returned in table order.

use crate::models::{Locale, LocalizedList, LocalizedText, Severity};
use crate::patterns::{PatternSnapshot, Trend};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Alert category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    PatternWarning,
    TrendWarning,
    TimePattern,
    LowGlucoseWarning,
}

/// Localized alert ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub recommendations: Vec<String>,
}

/// Alert rule thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Frequent-high fires when high readings exceed this share of pre-meal samples
    pub high_ratio: f64,

    /// Hour bucket inspected by the morning rule
    pub morning_hour: u32,

    /// Mean substituted when the morning bucket is empty
    pub morning_default: f64,

    /// Morning mean above this fires the morning rule (mg/dL)
    pub morning_threshold: f64,

    /// Frequent-low fires when low readings exceed this count
    pub low_count_limit: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        AlertConfig {
            high_ratio: 0.4,
            morning_hour: 8,
            morning_default: 100.0,
            morning_threshold: 140.0,
            low_count_limit: 2,
        }
    }
}

/// Value interpolated into a rule's message
#[derive(Debug, Clone, Copy, PartialEq)]
enum Evidence {
    Count(usize),
    Level(f64),
    Flag,
}

impl Evidence {
    fn render(&self) -> String {
        match self {
            Evidence::Count(n) => n.to_string(),
            Evidence::Level(v) => format!("{:.1}", v),
            Evidence::Flag => String::new(),
        }
    }
}

struct AlertRule {
    kind: AlertKind,
    severity: Severity,
    check: fn(&PatternSnapshot, &AlertConfig) -> Option<Evidence>,
    title: LocalizedText,
    /// `{value}` is replaced with the rendered evidence
    message: LocalizedText,
    recommendations: LocalizedList,
}

fn frequent_high(snapshot: &PatternSnapshot, config: &AlertConfig) -> Option<Evidence> {
    let limit = snapshot.pre_meal_count as f64 * config.high_ratio;
    (snapshot.high_count as f64 > limit).then_some(Evidence::Count(snapshot.high_count))
}

fn rising_trend(snapshot: &PatternSnapshot, _config: &AlertConfig) -> Option<Evidence> {
    (snapshot.trend == Trend::Rising).then_some(Evidence::Flag)
}

fn morning_high(snapshot: &PatternSnapshot, config: &AlertConfig) -> Option<Evidence> {
    // Missing morning data falls back to a value below the threshold, so the rule stays quiet.
    let morning_avg = snapshot
        .hour_mean(config.morning_hour)
        .unwrap_or(config.morning_default);
    (morning_avg > config.morning_threshold).then_some(Evidence::Level(morning_avg))
}

fn frequent_low(snapshot: &PatternSnapshot, config: &AlertConfig) -> Option<Evidence> {
    (snapshot.low_count > config.low_count_limit).then_some(Evidence::Count(snapshot.low_count))
}

static ALERT_RULES: [AlertRule; 4] = [
    AlertRule {
        kind: AlertKind::PatternWarning,
        severity: Severity::High,
        check: frequent_high,
        title: LocalizedText::new(
            "Frequent High Glucose Detected",
            "Sukari ya Damu ya Juu Imeonekana Mara Nyingi",
        ),
        message: LocalizedText::new(
            "You've had {value} high readings recently. Consider reviewing your meal portions and timing.",
            "Umekuwa na vipimo {value} vya juu hivi karibuni. Fikiria kuangalia vipimo vya chakula na muda.",
        ),
        recommendations: LocalizedList::new(
            &[
                "Reduce portion sizes, especially ugali and chapati",
                "Add more sukuma wiki and vegetables to meals",
                "Take a 15-minute walk after eating",
                "Check blood sugar 2 hours after meals",
            ],
            &[
                "Punguza vipimo vya chakula, hasa ugali na chapati",
                "Ongeza sukuma wiki na mboga zaidi kwenye chakula",
                "Tembea dakika 15 baada ya kula",
                "Angalia sukari ya damu masaa 2 baada ya chakula",
            ],
        ),
    },
    AlertRule {
        kind: AlertKind::TrendWarning,
        severity: Severity::Medium,
        check: rising_trend,
        title: LocalizedText::new(
            "Rising Glucose Trend",
            "Mwelekeo wa Sukari ya Damu Kuongezeka",
        ),
        message: LocalizedText::new(
            "Your recent readings show an upward trend. Time to take action!",
            "Vipimo vyako vya hivi karibuni vinaonyesha mwelekeo wa kuongezeka. Ni wakati wa kuchukua hatua!",
        ),
        recommendations: LocalizedList::new(
            &[
                "Review what you've eaten in the last few days",
                "Increase physical activity",
                "Consider smaller, more frequent meals",
                "Stay hydrated with water",
            ],
            &[
                "Angalia ulichokula katika siku chache zilizopita",
                "Ongeza mazoezi ya mwili",
                "Fikiria chakula kidogo, mara nyingi",
                "Kunywa maji mengi",
            ],
        ),
    },
    AlertRule {
        kind: AlertKind::TimePattern,
        severity: Severity::Medium,
        check: morning_high,
        title: LocalizedText::new("High Morning Glucose", "Sukari ya Damu ya Juu Asubuhi"),
        message: LocalizedText::new(
            "Your morning readings average {value} mg/dL, which is above target.",
            "Vipimo vyako vya asubuhi ni wastani wa {value} mg/dL, ambayo ni juu ya lengo.",
        ),
        recommendations: LocalizedList::new(
            &[
                "Avoid late-night snacking",
                "Consider what you ate for dinner last night",
                "Try light exercise before breakfast",
                "Discuss with your doctor about dawn phenomenon",
            ],
            &[
                "Epuka kula chakula kidogo usiku wa manane",
                "Fikiria ulichokula chakula cha jioni jana",
                "Jaribu mazoezi mepesi kabla ya kifungua kinywa",
                "Jadili na daktari wako kuhusu hali ya alfajiri",
            ],
        ),
    },
    AlertRule {
        kind: AlertKind::LowGlucoseWarning,
        severity: Severity::High,
        check: frequent_low,
        title: LocalizedText::new(
            "Frequent Low Glucose Episodes",
            "Sukari ya Damu ya Chini Mara Nyingi",
        ),
        message: LocalizedText::new(
            "You've had {value} low readings. This needs attention.",
            "Umekuwa na vipimo {value} vya chini. Hii inahitaji umakini.",
        ),
        recommendations: LocalizedList::new(
            &[
                "Always carry glucose tablets or sweets",
                "Don't skip meals",
                "Discuss medication timing with your doctor",
                "Check glucose before driving or exercising",
            ],
            &[
                "Beba daima vidonge vya sukari au peremende",
                "Usiruke chakula",
                "Jadili muda wa dawa na daktari wako",
                "Angalia sukari kabla ya kuendesha gari au kufanya mazoezi",
            ],
        ),
    },
];

/// Rule-table driven alert generator
#[derive(Debug, Clone, Default)]
pub struct AlertGenerator {
    config: AlertConfig,
}

impl AlertGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AlertConfig) -> Self {
        AlertGenerator { config }
    }

    /// Evaluate every rule against the snapshot, in table order.
    ///
    /// An absent snapshot (insufficient history) yields no alerts.
    pub fn generate(&self, snapshot: Option<&PatternSnapshot>, locale: Locale) -> Vec<Alert> {
        let Some(snapshot) = snapshot else {
            return Vec::new();
        };

        ALERT_RULES
            .iter()
            .filter_map(|rule| {
                let evidence = (rule.check)(snapshot, &self.config)?;
                debug!(kind = ?rule.kind, severity = ?rule.severity, "Alert rule fired");
                Some(Alert {
                    kind: rule.kind,
                    severity: rule.severity,
                    title: rule.title.get(locale).to_string(),
                    message: rule
                        .message
                        .get(locale)
                        .replace("{value}", &evidence.render()),
                    recommendations: rule.recommendations.get(locale),
                })
            })
            .collect()
    }
}

/// Generate alerts with default thresholds
pub fn generate_alerts(snapshot: Option<&PatternSnapshot>, locale: Locale) -> Vec<Alert> {
    AlertGenerator::new().generate(snapshot, locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn quiet_snapshot() -> PatternSnapshot {
        PatternSnapshot {
            reading_count: 10,
            avg_pre_meal: Some(110.0),
            pre_meal_count: 10,
            avg_post_meal: Some(150.0),
            post_meal_count: 0,
            high_count: 0,
            low_count: 0,
            hour_buckets: BTreeMap::new(),
            trend: Trend::Stable,
        }
    }

    #[test]
    fn test_no_snapshot_no_alerts() {
        assert!(generate_alerts(None, Locale::En).is_empty());
        assert!(generate_alerts(Some(&quiet_snapshot()), Locale::En).is_empty());
    }

    #[test]
    fn test_frequent_high_uses_sample_count() {
        let snapshot = PatternSnapshot {
            avg_pre_meal: Some(150.0),
            pre_meal_count: 3,
            high_count: 3,
            ..quiet_snapshot()
        };
        let alerts = generate_alerts(Some(&snapshot), Locale::En);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::PatternWarning);
        assert_eq!(alerts[0].severity, Severity::High);
        assert!(alerts[0].message.contains("3 high readings"));
        assert_eq!(alerts[0].recommendations.len(), 4);

        // 4 of 10 is not more than 40%
        let snapshot = PatternSnapshot {
            high_count: 4,
            ..quiet_snapshot()
        };
        assert!(generate_alerts(Some(&snapshot), Locale::En).is_empty());
    }

    #[test]
    fn test_frequent_high_without_pre_meal_samples() {
        // Post-meal highs with no pre-meal readings: any high exceeds 0.4 * 0
        let snapshot = PatternSnapshot {
            avg_pre_meal: None,
            pre_meal_count: 0,
            high_count: 1,
            ..quiet_snapshot()
        };
        let alerts = generate_alerts(Some(&snapshot), Locale::En);
        assert_eq!(alerts[0].kind, AlertKind::PatternWarning);
    }

    #[test]
    fn test_morning_rule() {
        let mut buckets = BTreeMap::new();
        buckets.insert(8, vec![150.0, 146.0]);
        let snapshot = PatternSnapshot {
            hour_buckets: buckets,
            ..quiet_snapshot()
        };
        let alerts = generate_alerts(Some(&snapshot), Locale::En);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::TimePattern);
        assert!(alerts[0].message.contains("148.0 mg/dL"));
    }

    #[test]
    fn test_morning_rule_default_is_quiet() {
        let mut buckets = BTreeMap::new();
        buckets.insert(9, vec![250.0, 260.0]);
        let snapshot = PatternSnapshot {
            hour_buckets: buckets,
            ..quiet_snapshot()
        };
        assert!(generate_alerts(Some(&snapshot), Locale::En).is_empty());

        // A custom default above the threshold makes the substitution visible
        let generator = AlertGenerator::with_config(AlertConfig {
            morning_default: 150.0,
            ..AlertConfig::default()
        });
        let alerts = generator.generate(Some(&quiet_snapshot()), Locale::En);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("150.0"));
    }

    #[test]
    fn test_all_rules_fire_in_table_order() {
        let mut buckets = BTreeMap::new();
        buckets.insert(8, vec![200.0]);
        let snapshot = PatternSnapshot {
            pre_meal_count: 2,
            high_count: 2,
            low_count: 3,
            hour_buckets: buckets,
            trend: Trend::Rising,
            ..quiet_snapshot()
        };
        let kinds: Vec<AlertKind> = generate_alerts(Some(&snapshot), Locale::En)
            .into_iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                AlertKind::PatternWarning,
                AlertKind::TrendWarning,
                AlertKind::TimePattern,
                AlertKind::LowGlucoseWarning,
            ]
        );
    }

    #[test]
    fn test_low_limit_is_exclusive() {
        let snapshot = PatternSnapshot {
            low_count: 2,
            ..quiet_snapshot()
        };
        assert!(generate_alerts(Some(&snapshot), Locale::En).is_empty());
    }

    #[test]
    fn test_swahili_text() {
        let snapshot = PatternSnapshot {
            low_count: 5,
            ..quiet_snapshot()
        };
        let alerts = generate_alerts(Some(&snapshot), Locale::Sw);
        assert_eq!(alerts[0].title, "Sukari ya Damu ya Chini Mara Nyingi");
        assert!(alerts[0].message.contains("vipimo 5 vya chini"));
        assert_eq!(alerts[0].recommendations[1], "Usiruke chakula");
    }

    #[test]
    fn test_serialized_shape() {
        let snapshot = PatternSnapshot {
            trend: Trend::Rising,
            ..quiet_snapshot()
        };
        let alerts = generate_alerts(Some(&snapshot), Locale::from_code("fr"));
        let json = serde_json::to_value(&alerts[0]).unwrap();
        assert_eq!(json["type"], "trend_warning");
        assert_eq!(json["severity"], "medium");
        assert_eq!(json["title"], "Rising Glucose Trend");
    }
}

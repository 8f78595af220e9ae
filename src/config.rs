use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::alerts::AlertConfig;
use crate::logging::{LogConfig, LogFormat, LogLevel};
use crate::models::{DiabetesType, Locale, UserProfile};
use crate::patterns::{PatternConfig, ANALYSIS_WINDOW_DAYS};
use crate::predictions::MEAL_WINDOW_DAYS;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,

    /// Pattern analyzer thresholds
    #[serde(default)]
    pub analysis: PatternConfig,

    /// Alert rule thresholds
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Logging output
    #[serde(default)]
    pub logging: LogConfig,

    /// Profile of the user whose readings the CLI analyzes
    #[serde(default)]
    pub profile: UserProfile,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Output language
    pub locale: Locale,

    /// Directory searched for reading files given by bare name
    pub data_dir: PathBuf,

    /// Diabetes type assumed for diet advice when the profile has none
    pub default_diabetes_type: DiabetesType,

    /// Days of history behind patterns, alerts and food impacts
    pub analysis_window_days: u64,

    /// Days of history behind the meal prediction
    pub meal_window_days: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            locale: Locale::En,
            data_dir: PathBuf::from("./data"),
            default_diabetes_type: DiabetesType::Type2,
            analysis_window_days: ANALYSIS_WINDOW_DAYS,
            meal_window_days: MEAL_WINDOW_DAYS,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            settings: AppSettings::default(),
            analysis: PatternConfig::default(),
            alerts: AlertConfig::default(),
            logging: LogConfig::default(),
            profile: UserProfile::default(),
        }
    }
}

/// Keys accepted by `get_value` / `set_value`
pub const CONFIG_KEYS: [&str; 16] = [
    "settings.locale",
    "settings.data_dir",
    "settings.default_diabetes_type",
    "settings.analysis_window_days",
    "settings.meal_window_days",
    "analysis.pre_meal_high",
    "analysis.post_meal_high",
    "analysis.low_threshold",
    "analysis.trend_delta",
    "logging.level",
    "logging.format",
    "profile.diabetes_type",
    "profile.height_cm",
    "profile.weight_kg",
    "profile.avg_post_meal",
    "alerts.high_ratio",
];

fn parse_number(key: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid number for {}: {}", key, raw))
}

fn parse_days(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid day count for {}: {}", key, raw))
}

fn parse_optional_number(key: &str, raw: &str) -> Result<Option<f64>> {
    match raw.trim() {
        "" | "none" => Ok(None),
        other => parse_number(key, other).map(Some),
    }
}

fn show_optional<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "none".to_string())
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".glucors")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(&Self::default_config_path())
    }

    /// Load from `path`, falling back to defaults when it is missing or invalid
    pub fn load_or_default_from(path: &Path) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Save configuration to default location
    pub fn save_default(&mut self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to_file(config_path)
    }

    /// Diabetes type from the profile, else the configured default
    pub fn diabetes_type(&self) -> DiabetesType {
        self.profile
            .diabetes_type
            .unwrap_or(self.settings.default_diabetes_type)
    }

    /// Read a single setting by dotted key
    pub fn get_value(&self, key: &str) -> Result<String> {
        let value = match key {
            "settings.locale" => self.settings.locale.to_string(),
            "settings.data_dir" => self.settings.data_dir.display().to_string(),
            "settings.default_diabetes_type" => self.settings.default_diabetes_type.to_string(),
            "settings.analysis_window_days" => self.settings.analysis_window_days.to_string(),
            "settings.meal_window_days" => self.settings.meal_window_days.to_string(),
            "analysis.pre_meal_high" => self.analysis.pre_meal_high.to_string(),
            "analysis.post_meal_high" => self.analysis.post_meal_high.to_string(),
            "analysis.low_threshold" => self.analysis.low_threshold.to_string(),
            "analysis.trend_delta" => self.analysis.trend_delta.to_string(),
            "logging.level" => self.logging.level.as_str().to_string(),
            "logging.format" => format!("{:?}", self.logging.format).to_lowercase(),
            "profile.diabetes_type" => show_optional(&self.profile.diabetes_type),
            "profile.height_cm" => show_optional(&self.profile.height_cm),
            "profile.weight_kg" => show_optional(&self.profile.weight_kg),
            "profile.avg_post_meal" => show_optional(&self.profile.avg_post_meal),
            "alerts.high_ratio" => self.alerts.high_ratio.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {} (known keys: {})",
                key,
                CONFIG_KEYS.join(", ")
            ),
        };
        Ok(value)
    }

    /// Update a single setting by dotted key
    pub fn set_value(&mut self, key: &str, raw: &str) -> Result<()> {
        match key {
            "settings.locale" => self.settings.locale = Locale::from_code(raw),
            "settings.data_dir" => self.settings.data_dir = PathBuf::from(raw),
            "settings.default_diabetes_type" => {
                self.settings.default_diabetes_type =
                    raw.parse::<DiabetesType>().map_err(anyhow::Error::msg)?
            }
            "settings.analysis_window_days" => {
                self.settings.analysis_window_days = parse_days(key, raw)?
            }
            "settings.meal_window_days" => self.settings.meal_window_days = parse_days(key, raw)?,
            "analysis.pre_meal_high" => self.analysis.pre_meal_high = parse_number(key, raw)?,
            "analysis.post_meal_high" => self.analysis.post_meal_high = parse_number(key, raw)?,
            "analysis.low_threshold" => self.analysis.low_threshold = parse_number(key, raw)?,
            "analysis.trend_delta" => self.analysis.trend_delta = parse_number(key, raw)?,
            "logging.level" => {
                self.logging.level = raw.parse::<LogLevel>().map_err(anyhow::Error::msg)?
            }
            "logging.format" => {
                self.logging.format = raw.parse::<LogFormat>().map_err(anyhow::Error::msg)?
            }
            "profile.diabetes_type" => {
                self.profile.diabetes_type = match raw.trim() {
                    "" | "none" => None,
                    other => Some(other.parse::<DiabetesType>().map_err(anyhow::Error::msg)?),
                }
            }
            "profile.height_cm" => self.profile.height_cm = parse_optional_number(key, raw)?,
            "profile.weight_kg" => self.profile.weight_kg = parse_optional_number(key, raw)?,
            "profile.avg_post_meal" => {
                self.profile.avg_post_meal = parse_optional_number(key, raw)?
            }
            "alerts.high_ratio" => self.alerts.high_ratio = parse_number(key, raw)?,
            _ => anyhow::bail!(
                "Unknown config key: {} (known keys: {})",
                key,
                CONFIG_KEYS.join(", ")
            ),
        }

        self.metadata.updated_at = Utc::now();
        Ok(())
    }
}

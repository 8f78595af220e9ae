use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::error::{ImportError, Result};
use crate::import::{has_extension, ImportFormat};
use crate::models::{parse_time_of_day, MealContext, Reading};

const FORMAT: &str = "CSV";

/// CSV importer with flexible column mapping
pub struct CsvImporter {
    column_mapping: HashMap<String, String>,
}

impl CsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        // Common column name variations from meter exports
        Self::add_mapping(
            &mut column_mapping,
            "value",
            &["value", "glucose", "bg", "reading", "mg_dl", "glucose_mg_dl", "sugar"],
        );
        Self::add_mapping(&mut column_mapping, "date", &["date", "day", "reading_date"]);
        Self::add_mapping(
            &mut column_mapping,
            "time",
            &["time", "time_of_day", "reading_time", "clock"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "timestamp",
            &["timestamp", "datetime", "date_time", "recorded_at"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "context",
            &["context", "meal_context", "meal", "tag"],
        );
        Self::add_mapping(&mut column_mapping, "notes", &["notes", "note", "comment", "comments"]);

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    fn normalize_column_name(&self, name: &str) -> String {
        let normalized = name.trim().to_lowercase().replace([' ', '-', '/'], "_");

        self.column_mapping
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    fn parse_date(raw: &str) -> Option<NaiveDate> {
        const FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
        FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
    }

    fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
        const FORMATS: [&str; 4] = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M",
        ];
        FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }

    fn parse_error(record: usize, reason: impl Into<String>) -> ImportError {
        ImportError::ParseError {
            format: FORMAT.to_string(),
            record,
            reason: reason.into(),
        }
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "csv")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<Reading>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(file_path)
            .map_err(|e| Self::parse_error(0, e.to_string()))?;

        let headers = reader
            .headers()
            .map_err(|e| Self::parse_error(0, e.to_string()))?
            .clone();

        // Map headers to standard names
        let columns: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (self.normalize_column_name(header), i))
            .collect();

        if !columns.contains_key("value") {
            return Err(ImportError::MissingField {
                field: "value".to_string(),
            }
            .into());
        }
        if !columns.contains_key("date") && !columns.contains_key("timestamp") {
            return Err(ImportError::MissingField {
                field: "date".to_string(),
            }
            .into());
        }

        let mut readings = Vec::new();

        for (index, result) in reader.records().enumerate() {
            let record_no = index + 1;
            let record = result.map_err(|e| Self::parse_error(record_no, e.to_string()))?;
            let field = |name: &str| {
                columns
                    .get(name)
                    .and_then(|&i| record.get(i))
                    .filter(|v| !v.is_empty())
            };

            let raw_value = field("value")
                .ok_or_else(|| Self::parse_error(record_no, "empty glucose value"))?;
            let value: f64 = raw_value
                .parse()
                .map_err(|_| Self::parse_error(record_no, format!("invalid number '{}'", raw_value)))?;

            let timestamp = field("timestamp").and_then(Self::parse_datetime);

            let date = match field("date") {
                Some(raw) => Self::parse_date(raw)
                    .ok_or_else(|| Self::parse_error(record_no, format!("invalid date '{}'", raw)))?,
                None => timestamp
                    .map(|ts| ts.date())
                    .ok_or_else(|| Self::parse_error(record_no, "missing date"))?,
            };

            let time: Option<NaiveTime> = match field("time") {
                Some(raw) => Some(
                    parse_time_of_day(raw)
                        .ok_or_else(|| Self::parse_error(record_no, format!("invalid time '{}'", raw)))?,
                ),
                None => timestamp.map(|ts| ts.time()),
            };

            let context = match field("context") {
                Some(raw) => raw.parse::<MealContext>().unwrap_or_else(|_| {
                    warn!(record = record_no, context = raw, "Unknown meal context, using none");
                    MealContext::None
                }),
                None => MealContext::None,
            };

            readings.push(Reading {
                value,
                date,
                time,
                context,
                notes: field("notes").map(str::to_string),
            });
        }

        Ok(readings)
    }

    fn get_format_name(&self) -> &'static str {
        FORMAT
    }
}

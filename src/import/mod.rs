use crate::error::{GlucorsError, ImportError, Result};
use crate::models::Reading;
use std::path::Path;
use tracing::{info, warn};

pub mod csv;
pub mod json;

/// Lowest glucose value a meter reports (mg/dL)
pub const MIN_GLUCOSE: f64 = 40.0;

/// Highest glucose value a meter reports (mg/dL)
pub const MAX_GLUCOSE: f64 = 500.0;

/// Trait for loading readings from different file formats
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Load readings from the file
    fn import_file(&self, file_path: &Path) -> Result<Vec<Reading>>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Picks an importer by file extension and validates what it returns
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat + Send + Sync>>,
}

impl ImportManager {
    pub fn new() -> Self {
        let importers: Vec<Box<dyn ImportFormat + Send + Sync>> = vec![
            Box::new(csv::CsvImporter::new()),
            Box::new(json::JsonImporter::new()),
        ];

        Self { importers }
    }

    /// Import a single file, auto-detecting the format
    pub fn import_file(&self, file_path: &Path) -> Result<Vec<Reading>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound {
                path: file_path.to_path_buf(),
            }
            .into());
        }

        let importer = self
            .importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .ok_or_else(|| ImportError::UnsupportedFormat {
                format: file_path
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            })?;

        info!(
            path = %file_path.display(),
            format = importer.get_format_name(),
            "Importing readings"
        );

        let readings = importer.import_file(file_path)?;
        validate_readings(&readings)?;

        info!(count = readings.len(), "Readings imported");
        Ok(readings)
    }

    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers.iter().any(|importer| importer.can_import(file_path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject values no glucose meter would produce. Records are numbered from 1.
pub fn validate_readings(readings: &[Reading]) -> Result<()> {
    for (index, reading) in readings.iter().enumerate() {
        if !reading.value.is_finite() || !(MIN_GLUCOSE..=MAX_GLUCOSE).contains(&reading.value) {
            warn!(record = index + 1, value = reading.value, "Glucose value out of range");
            return Err(GlucorsError::Import(ImportError::InvalidValue {
                record: index + 1,
                value: reading.value,
            }));
        }
    }
    Ok(())
}

pub(crate) fn has_extension(file_path: &Path, wanted: &str) -> bool {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

/// Import readings from a CSV or JSON file
pub fn load_readings(file_path: &Path) -> Result<Vec<Reading>> {
    ImportManager::new().import_file(file_path)
}

//! Unified error hierarchy for glucors
//!
//! The analytics components never fail on well-typed input: insufficient data
//! and unknown locales resolve to empty results or English text. Errors only
//! arise at the edges (reading import, report files, explicit food lookups).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all glucors operations
#[derive(Debug, Error)]
pub enum GlucorsError {
    /// Reading import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Food name has no catalog entry
    #[error("Food not found in catalog: {name}")]
    FoodNotFound { name: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while loading a reading snapshot from disk
#[derive(Debug, Error)]
pub enum ImportError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Unsupported file format
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Format-specific parsing error
    #[error("Parse error in {format} at record {record}: {reason}")]
    ParseError {
        format: String,
        record: usize,
        reason: String,
    },

    /// Missing required column or field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Glucose value outside the accepted meter range
    #[error("Invalid glucose value at record {record}: {value} mg/dL")]
    InvalidValue { record: usize, value: f64 },
}

/// Result type alias for glucors operations
pub type Result<T> = std::result::Result<T, GlucorsError>;

impl GlucorsError {
    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            GlucorsError::FoodNotFound { name } => {
                format!("'{}' is not in the food catalog. Try one of the listed foods.", name)
            }
            GlucorsError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find readings file: {}", path.display())
            }
            GlucorsError::Import(ImportError::InvalidValue { record, value }) => {
                format!(
                    "Reading {} has an out-of-range glucose value ({} mg/dL). Meters report 40-500 mg/dL.",
                    record, value
                )
            }
            _ => self.to_string(),
        }
    }
}

use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::import::{has_extension, ImportFormat};
use crate::models::Reading;

/// Accepts a bare array of readings or an object with a `readings` field,
/// which is how the record store exports a user snapshot.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReadingsDocument {
    List(Vec<Reading>),
    Snapshot { readings: Vec<Reading> },
}

pub struct JsonImporter;

impl JsonImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for JsonImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "json")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<Reading>> {
        let reader = BufReader::new(File::open(file_path)?);
        let document: ReadingsDocument =
            serde_json::from_reader(reader).map_err(|e| ImportError::ParseError {
                format: "JSON".to_string(),
                record: 0,
                reason: e.to_string(),
            })?;

        Ok(match document {
            ReadingsDocument::List(readings) => readings,
            ReadingsDocument::Snapshot { readings } => readings,
        })
    }

    fn get_format_name(&self) -> &'static str {
        "JSON"
    }
}

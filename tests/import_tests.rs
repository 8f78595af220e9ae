use chrono::{NaiveDate, NaiveTime};
use glucors::error::{GlucorsError, ImportError};
use glucors::import::{load_readings, ImportManager};
use glucors::models::MealContext;
use std::fs;
use tempfile::TempDir;

/// Integration tests for reading import from disk

#[cfg(test)]
mod import_tests {
    use super::*;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_csv_with_meter_column_names() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "meter.csv",
            "Glucose (mg/dL),Date,Time,Meal Context,Notes\n\
             132,2024-03-01,07:15,before meal,\n\
             188,2024-03-01,13:40,after-meal,ugali lunch\n\
             95,02/03/2024,,fasting,\n",
        );

        // "glucose_(mg_dl)" is not an alias, so this file has no value column
        let err = load_readings(&path).unwrap_err();
        assert!(matches!(
            err,
            GlucorsError::Import(ImportError::MissingField { ref field }) if field == "value"
        ));

        let path = write_file(
            &dir,
            "meter2.csv",
            "BG,Date,Time,Meal Context,Notes\n\
             132,2024-03-01,07:15,before meal,\n\
             188,2024-03-01,13:40,after-meal,ugali lunch\n\
             95,02/03/2024,,fasting,\n",
        );
        let readings = load_readings(&path).unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].context, MealContext::PreMeal);
        assert_eq!(readings[0].time, NaiveTime::from_hms_opt(7, 15, 0));
        assert_eq!(readings[1].context, MealContext::PostMeal);
        assert_eq!(readings[1].notes.as_deref(), Some("ugali lunch"));
        assert_eq!(readings[2].date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(readings[2].time, None);
        assert_eq!(readings[2].context, MealContext::Fasting);
    }

    #[test]
    fn test_csv_timestamp_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "export.csv",
            "timestamp,value\n2024-05-10T08:30:00,145\n2024-05-10 21:05,99\n",
        );
        let readings = load_readings(&path).unwrap();
        assert_eq!(readings[0].date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(readings[0].hour(), Some(8));
        assert_eq!(readings[1].hour(), Some(21));
        assert_eq!(readings[1].context, MealContext::None);
    }

    #[test]
    fn test_csv_out_of_range_value() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.csv", "value,date\n120,2024-01-01\n20,2024-01-02\n");
        let err = load_readings(&path).unwrap_err();
        assert!(matches!(
            err,
            GlucorsError::Import(ImportError::InvalidValue { record: 2, .. })
        ));
    }

    #[test]
    fn test_csv_unparseable_number() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "text.csv", "value,date\nhigh,2024-01-01\n");
        let err = load_readings(&path).unwrap_err();
        assert!(matches!(
            err,
            GlucorsError::Import(ImportError::ParseError { record: 1, .. })
        ));
    }

    #[test]
    fn test_json_array_and_snapshot_object() {
        let dir = TempDir::new().unwrap();
        let array = write_file(
            &dir,
            "readings.json",
            r#"[
                {"value": 140, "date": "2024-06-01", "time": "07:30", "context": "pre_meal"},
                {"value": 175.5, "date": "2024-06-01", "context": "snack"}
            ]"#,
        );
        let readings = load_readings(&array).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].context, MealContext::PreMeal);
        assert_eq!(readings[0].hour(), Some(7));
        // unknown context labels fall back to none
        assert_eq!(readings[1].context, MealContext::None);

        let object = write_file(
            &dir,
            "snapshot.json",
            r#"{"user_id": "u1", "readings": [{"value": 101, "date": "2024-06-02"}]}"#,
        );
        let readings = load_readings(&object).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].time, None);
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        let dir = TempDir::new().unwrap();
        let err = load_readings(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(
            err,
            GlucorsError::Import(ImportError::FileNotFound { .. })
        ));

        let path = write_file(&dir, "readings.xml", "<readings/>");
        let manager = ImportManager::new();
        assert!(!manager.can_import_file(&path));
        let err = manager.import_file(&path).unwrap_err();
        assert!(matches!(
            err,
            GlucorsError::Import(ImportError::UnsupportedFormat { ref format }) if format == "xml"
        ));
    }
}

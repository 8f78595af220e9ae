//! Daily challenges
//!
//! Each challenge is a rule over the readings logged on one calendar day.

use crate::models::{Locale, LocalizedText, Reading};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Readings before this hour satisfy the morning check
pub const MORNING_CUTOFF_HOUR: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeId {
    LogReading,
    MorningCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeStatus {
    pub completed: bool,
    pub progress: u32,
}

pub struct Challenge {
    pub id: ChallengeId,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub icon: &'static str,
    pub points: u32,
    evaluate: fn(&[&Reading]) -> ChallengeStatus,
}

fn log_reading(day: &[&Reading]) -> ChallengeStatus {
    ChallengeStatus {
        completed: !day.is_empty(),
        progress: day.len() as u32,
    }
}

fn morning_check(day: &[&Reading]) -> ChallengeStatus {
    let done = day
        .iter()
        .any(|r| r.hour().is_some_and(|hour| hour < MORNING_CUTOFF_HOUR));
    ChallengeStatus {
        completed: done,
        progress: u32::from(done),
    }
}

pub static CHALLENGES: [Challenge; 2] = [
    Challenge {
        id: ChallengeId::LogReading,
        name: LocalizedText::new("Log Reading", "Rejesha Kipimo"),
        description: LocalizedText::new("Record one reading today", "Rekodi kipimo kimoja leo"),
        icon: "📊",
        points: 10,
        evaluate: log_reading,
    },
    Challenge {
        id: ChallengeId::MorningCheck,
        name: LocalizedText::new("Morning Check", "Ukaguzi wa Asubuhi"),
        description: LocalizedText::new("Log before 10 AM", "Rejesha kabla ya saa 10"),
        icon: "🌅",
        points: 15,
        evaluate: morning_check,
    },
];

/// Localized challenge with its status for one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub id: ChallengeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub points: u32,
    #[serde(flatten)]
    pub status: ChallengeStatus,
}

/// Evaluate every catalog challenge for `target` (today when `None`)
pub fn daily_challenges(
    readings: &[Reading],
    target: Option<NaiveDate>,
    locale: Locale,
) -> Vec<DailyChallenge> {
    let target = target.unwrap_or_else(|| Local::now().date_naive());
    let day: Vec<&Reading> = readings.iter().filter(|r| r.date == target).collect();

    CHALLENGES
        .iter()
        .map(|challenge| DailyChallenge {
            id: challenge.id,
            name: challenge.name.get(locale).to_string(),
            description: challenge.description.get(locale).to_string(),
            icon: challenge.icon.to_string(),
            points: challenge.points,
            status: (challenge.evaluate)(&day),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 3).unwrap()
    }

    fn at(date: NaiveDate, hour: u32) -> Reading {
        Reading::new(105.0, date).with_time(NaiveTime::from_hms_opt(hour, 30, 0).unwrap())
    }

    #[test]
    fn test_log_reading_counts_target_day_only() {
        let yesterday = day().pred_opt().unwrap();
        let readings = vec![at(day(), 12), at(day(), 18), at(yesterday, 7)];
        let status = daily_challenges(&readings, Some(day()), Locale::En);

        assert_eq!(status[0].id, ChallengeId::LogReading);
        assert!(status[0].status.completed);
        assert_eq!(status[0].status.progress, 2);

        // the 07:30 reading was yesterday
        assert!(!status[1].status.completed);
        assert_eq!(status[1].status.progress, 0);
    }

    #[test]
    fn test_morning_check_is_binary() {
        let readings = vec![at(day(), 6), at(day(), 8), at(day(), 9)];
        let status = daily_challenges(&readings, Some(day()), Locale::En);
        assert!(status[1].status.completed);
        assert_eq!(status[1].status.progress, 1);
    }

    #[test]
    fn test_morning_check_boundary_and_missing_time() {
        let readings = vec![at(day(), 10), Reading::new(99.0, day())];
        let status = daily_challenges(&readings, Some(day()), Locale::En);
        assert!(!status[1].status.completed);
        assert_eq!(status[0].status.progress, 2);
    }

    #[test]
    fn test_empty_day() {
        let status = daily_challenges(&[], Some(day()), Locale::Sw);
        assert_eq!(status.len(), 2);
        assert!(status.iter().all(|c| !c.status.completed && c.status.progress == 0));
        assert_eq!(status[1].name, "Ukaguzi wa Asubuhi");
    }

    #[test]
    fn test_json_shape() {
        let status = daily_challenges(&[at(day(), 7)], Some(day()), Locale::En);
        let json = serde_json::to_value(&status[1]).unwrap();
        assert_eq!(json["id"], "morning_check");
        assert_eq!(json["completed"], true);
        assert_eq!(json["progress"], 1);
        assert_eq!(json["icon"], "🌅");
    }
}

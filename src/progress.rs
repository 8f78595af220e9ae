//! Streaks, levels and badges
//!
//! Everything here is derived from the set of reading dates and a reference
//! "today". Three separate point systems exist and are kept apart:
//!
//! - level points: `total_readings * 10`, used only for level banding
//! - total points: `total_readings * 10 + current_streak * 5`, shown to the user
//! - badge points: fixed per badge in the catalog

use crate::models::{Locale, LocalizedText, Reading};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Points per logged reading
pub const POINTS_PER_READING: u32 = 10;

/// Points per day of the current streak
pub const POINTS_PER_STREAK_DAY: u32 = 5;

/// Consecutive days needed for the week streak badge
pub const WEEK_STREAK_DAYS: u32 = 7;

/// Days before `today` counted as "this week"
pub const WEEKLY_WINDOW_DAYS: u64 = 7;

/// Progress level derived from level points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Tier 1-4
    pub level: u8,
    pub title: String,
}

struct LevelTier {
    level: u8,
    /// Exclusive upper bound on level points; `None` for the top tier
    below: Option<u32>,
    title: LocalizedText,
}

static LEVEL_TIERS: [LevelTier; 4] = [
    LevelTier {
        level: 1,
        below: Some(50),
        title: LocalizedText::new("Beginner", "Mwanzo"),
    },
    LevelTier {
        level: 2,
        below: Some(150),
        title: LocalizedText::new("Learner", "Mwanafunzi"),
    },
    LevelTier {
        level: 3,
        below: Some(300),
        title: LocalizedText::new("Tracker", "Mfuatiliaji"),
    },
    LevelTier {
        level: 4,
        below: None,
        title: LocalizedText::new("Expert", "Mtaalamu"),
    },
];

/// Band a level-points value into a tier
pub fn calculate_level(points: u32, locale: Locale) -> LevelInfo {
    let tier = LEVEL_TIERS
        .iter()
        .find(|tier| tier.below.map_or(true, |bound| points < bound))
        .unwrap_or(&LEVEL_TIERS[LEVEL_TIERS.len() - 1]);

    LevelInfo {
        level: tier.level,
        title: tier.title.get(locale).to_string(),
    }
}

/// Points used for level banding. The streak does not contribute.
/// Saturates at `u32::MAX`.
pub fn level_points(total_readings: usize) -> u32 {
    u32::try_from(total_readings)
        .unwrap_or(u32::MAX)
        .saturating_mul(POINTS_PER_READING)
}

/// Points displayed to the user
pub fn total_points(total_readings: usize, current_streak: u32) -> u32 {
    level_points(total_readings)
        .saturating_add(current_streak.saturating_mul(POINTS_PER_STREAK_DAY))
}

fn distinct_dates(readings: &[Reading]) -> BTreeSet<NaiveDate> {
    readings.iter().map(|r| r.date).collect()
}

/// Consecutive days with at least one reading, counting back from `today`.
/// Zero when nothing was logged today.
pub fn current_streak(readings: &[Reading], today: NaiveDate) -> u32 {
    let dates = distinct_dates(readings);
    let mut streak = 0;
    let mut day = Some(today);

    while let Some(d) = day {
        if !dates.contains(&d) {
            break;
        }
        streak += 1;
        day = d.checked_sub_days(Days::new(1));
    }

    streak
}

/// Readings dated from `today - 7` through `today`
pub fn weekly_readings(readings: &[Reading], today: NaiveDate) -> usize {
    let start = today
        .checked_sub_days(Days::new(WEEKLY_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    readings
        .iter()
        .filter(|r| r.date >= start && r.date <= today)
        .count()
}

/// Longest run of consecutive calendar dates anywhere in the history
pub fn longest_run(readings: &[Reading]) -> u32 {
    let dates = distinct_dates(readings);
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &date in dates.iter().rev() {
        run = match previous {
            Some(prev) if prev.checked_sub_days(Days::new(1)) == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }

    longest
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeId {
    FirstReading,
    WeekStreak,
    GlucoseChampion,
}

impl BadgeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeId::FirstReading => "first_reading",
            BadgeId::WeekStreak => "week_streak",
            BadgeId::GlucoseChampion => "glucose_champion",
        }
    }
}

/// Static badge definition
pub struct Badge {
    pub id: BadgeId,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub icon: &'static str,
    pub points: u32,
    /// Award rule; `None` means the badge is declared but cannot be earned yet
    rule: Option<fn(&[Reading]) -> bool>,
}

impl Badge {
    pub fn is_earned(&self, readings: &[Reading]) -> bool {
        self.rule.is_some_and(|rule| rule(readings))
    }

    fn localized(&self, locale: Locale) -> EarnedBadge {
        EarnedBadge {
            id: self.id,
            name: self.name.get(locale).to_string(),
            description: self.description.get(locale).to_string(),
            icon: self.icon.to_string(),
            points: self.points,
        }
    }
}

fn has_any_reading(readings: &[Reading]) -> bool {
    !readings.is_empty()
}

fn has_week_run(readings: &[Reading]) -> bool {
    longest_run(readings) >= WEEK_STREAK_DAYS
}

pub static BADGES: [Badge; 3] = [
    Badge {
        id: BadgeId::FirstReading,
        name: LocalizedText::new("First Steps", "Hatua za Kwanza"),
        description: LocalizedText::new(
            "Logged your first reading",
            "Umerejesha kipimo chako cha kwanza",
        ),
        icon: "🩸",
        points: 10,
        rule: Some(has_any_reading),
    },
    Badge {
        id: BadgeId::WeekStreak,
        name: LocalizedText::new("Week Warrior", "Shujaa wa Wiki"),
        description: LocalizedText::new("7 consecutive days", "Siku 7 mfululizo"),
        icon: "🔥",
        points: 50,
        rule: Some(has_week_run),
    },
    Badge {
        id: BadgeId::GlucoseChampion,
        name: LocalizedText::new("Glucose Champion", "Bingwa wa Sukari"),
        description: LocalizedText::new("Target levels for 5 days", "Viwango vya lengo kwa siku 5"),
        icon: "🏆",
        points: 75,
        rule: None,
    },
];

/// Localized badge for output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedBadge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub points: u32,
}

/// Catalog entry with the user's earned flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeListing {
    #[serde(flatten)]
    pub badge: EarnedBadge,
    pub earned: bool,
}

/// Ids of earned badges in catalog order
pub fn earned_badges(readings: &[Reading]) -> Vec<BadgeId> {
    BADGES
        .iter()
        .filter(|badge| badge.is_earned(readings))
        .map(|badge| badge.id)
        .collect()
}

/// Every catalog badge with its earned flag
pub fn available_badges(readings: &[Reading], locale: Locale) -> Vec<BadgeListing> {
    BADGES
        .iter()
        .map(|badge| BadgeListing {
            badge: badge.localized(locale),
            earned: badge.is_earned(readings),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current_streak: u32,
    pub total_readings: usize,
    pub weekly_readings: usize,
    pub level: LevelInfo,
    pub total_points: u32,
}

/// Progress block plus earned badges for a reading history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub progress: Progress,
    pub badges: Vec<EarnedBadge>,
}

/// Compute the progress block for `today`
pub fn user_progress(readings: &[Reading], today: NaiveDate, locale: Locale) -> Progress {
    let total_readings = readings.len();
    let streak = current_streak(readings, today);

    Progress {
        current_streak: streak,
        total_readings,
        weekly_readings: weekly_readings(readings, today),
        level: calculate_level(level_points(total_readings), locale),
        total_points: total_points(total_readings, streak),
    }
}

/// Progress and localized earned badges in one pass over the catalogs
pub fn evaluate_progress(readings: &[Reading], today: NaiveDate, locale: Locale) -> ProgressReport {
    let progress = user_progress(readings, today, locale);
    let badges: Vec<EarnedBadge> = BADGES
        .iter()
        .filter(|badge| badge.is_earned(readings))
        .map(|badge| badge.localized(locale))
        .collect();

    debug!(
        streak = progress.current_streak,
        total = progress.total_readings,
        level = progress.level.level,
        badges = badges.len(),
        "Progress evaluated"
    );

    ProgressReport { progress, badges }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 20).unwrap()
    }

    fn on_days_ago(days: &[u64]) -> Vec<Reading> {
        days.iter()
            .map(|&d| Reading::new(110.0, today().checked_sub_days(Days::new(d)).unwrap()))
            .collect()
    }

    #[test]
    fn test_current_streak() {
        let readings = on_days_ago(&[0, 1, 2, 4, 5]);
        assert_eq!(current_streak(&readings, today()), 3);

        // several readings on one day count once
        let readings = on_days_ago(&[0, 0, 0, 1]);
        assert_eq!(current_streak(&readings, today()), 2);

        let readings = on_days_ago(&[1, 2, 3]);
        assert_eq!(current_streak(&readings, today()), 0);
        assert_eq!(current_streak(&[], today()), 0);
    }

    #[test]
    fn test_weekly_readings_window() {
        let readings = on_days_ago(&[0, 3, 6, 7, 8, 30]);
        assert_eq!(weekly_readings(&readings, today()), 4);

        let readings = on_days_ago(&[0, 7]);
        assert_eq!(user_progress(&readings, today(), Locale::En).weekly_readings, 2);
    }

    #[test]
    fn test_level_banding() {
        assert_eq!(calculate_level(0, Locale::En).level, 1);
        assert_eq!(calculate_level(49, Locale::En).title, "Beginner");
        assert_eq!(calculate_level(50, Locale::Sw).title, "Mwanafunzi");
        assert_eq!(calculate_level(150, Locale::En).level, 3);
        assert_eq!(calculate_level(299, Locale::En).level, 3);
        assert_eq!(calculate_level(300, Locale::Sw).title, "Mtaalamu");
    }

    #[test]
    fn test_point_systems_are_separate() {
        // 4 readings with a 4-day streak: level stays on reading count alone
        let readings = on_days_ago(&[0, 1, 2, 3]);
        let progress = user_progress(&readings, today(), Locale::En);
        assert_eq!(progress.current_streak, 4);
        assert_eq!(progress.total_points, 60);
        assert_eq!(progress.level.level, 1);

        let readings = on_days_ago(&[0, 1, 2, 3, 10]);
        let progress = user_progress(&readings, today(), Locale::En);
        assert_eq!(progress.total_points, 70);
        assert_eq!(progress.level.level, 2);
    }

    #[test]
    fn test_points_saturate() {
        assert_eq!(level_points(usize::MAX), u32::MAX);
        assert_eq!(total_points(usize::MAX, 10), u32::MAX);
        assert_eq!(total_points(1, u32::MAX), u32::MAX);
        assert_eq!(calculate_level(level_points(usize::MAX), Locale::En).level, 4);
    }

    #[test]
    fn test_week_streak_not_anchored_to_today() {
        // run of 7 days ending 10 days ago, then sparse logging
        let readings = on_days_ago(&[10, 11, 12, 13, 14, 15, 16, 5, 2]);
        assert_eq!(current_streak(&readings, today()), 0);
        assert_eq!(longest_run(&readings), 7);
        assert_eq!(
            earned_badges(&readings),
            vec![BadgeId::FirstReading, BadgeId::WeekStreak]
        );
    }

    #[test]
    fn test_six_day_run_is_not_enough() {
        let readings = on_days_ago(&[0, 1, 2, 3, 4, 5, 7]);
        assert_eq!(longest_run(&readings), 6);
        assert_eq!(earned_badges(&readings), vec![BadgeId::FirstReading]);
    }

    #[test]
    fn test_glucose_champion_never_earned() {
        let days: Vec<u64> = (0..30).collect();
        let readings = on_days_ago(&days);
        let listing = available_badges(&readings, Locale::En);
        assert_eq!(listing.len(), 3);
        assert!(listing[0].earned && listing[1].earned);
        assert!(!listing[2].earned);
        assert_eq!(listing[2].badge.icon, "🏆");
    }

    #[test]
    fn test_no_readings() {
        assert!(earned_badges(&[]).is_empty());
        let report = evaluate_progress(&[], today(), Locale::Sw);
        assert_eq!(report.progress.level.title, "Mwanzo");
        assert_eq!(report.progress.total_points, 0);
        assert!(report.badges.is_empty());
    }

    #[test]
    fn test_badge_listing_json() {
        let readings = on_days_ago(&[0]);
        let listing = available_badges(&readings, Locale::Sw);
        let json = serde_json::to_value(&listing[0]).unwrap();
        assert_eq!(json["id"], "first_reading");
        assert_eq!(json["name"], "Hatua za Kwanza");
        assert_eq!(json["earned"], true);
        assert_eq!(json["points"], 10);
    }
}

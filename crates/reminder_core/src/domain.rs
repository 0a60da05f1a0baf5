//! crates/reminder_core/src/domain.rs
//!
//! Defines the pure, core data structures for the reminder scheduler.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};

//=========================================================================================
// People
//=========================================================================================

/// What kind of yearly occasion a person is recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OccasionKind {
    Birthday,
    Anniversary,
    Other,
}

impl OccasionKind {
    /// Stable lowercase name, used for signatures and serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            OccasionKind::Birthday => "birthday",
            OccasionKind::Anniversary => "anniversary",
            OccasionKind::Other => "other",
        }
    }
}

/// A person (or couple) whose yearly date should be remembered.
///
/// `date_iso` is kept as the raw `YYYY-MM-DD` string the store hands us. It is
/// parsed on demand by the recurrence calculator, so one malformed record only
/// drops that record from a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub kind: OccasionKind,
    pub date_iso: String,
    /// Free-form description, only shown for `OccasionKind::Other`.
    pub label: Option<String>,
    pub same_day_reminder: Option<bool>,
}

impl Person {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: OccasionKind,
        date_iso: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            date_iso: date_iso.into(),
            label: None,
            same_day_reminder: None,
        }
    }

    /// Same-day reminders are on unless explicitly switched off.
    pub fn wants_same_day_reminder(&self) -> bool {
        self.same_day_reminder.unwrap_or(true)
    }
}

//=========================================================================================
// Settings
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Nl,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Nl => "nl",
            Locale::En => "en",
        }
    }
}

/// The notification-relevant subset of the user's settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub weekly_summary_enabled: bool,
    /// ISO weekday, Monday = 1 through Sunday = 7.
    pub weekly_summary_weekday: u32,
    pub weekly_summary_hour: u32,
    pub weekly_summary_minute: u32,
    pub same_day_hour: u32,
    pub same_day_minute: u32,
    pub locale: Locale,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weekly_summary_enabled: true,
            weekly_summary_weekday: 1,
            weekly_summary_hour: 9,
            weekly_summary_minute: 0,
            same_day_hour: 9,
            same_day_minute: 0,
            locale: Locale::Nl,
        }
    }
}

impl Settings {
    /// Local time-of-day for same-day reminders, `None` if out of range.
    pub fn same_day_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.same_day_hour, self.same_day_minute, 0)
    }

    /// Local time-of-day for the weekly digest, `None` if out of range.
    pub fn weekly_summary_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.weekly_summary_hour, self.weekly_summary_minute, 0)
    }

    pub fn summary_weekday(&self) -> Option<Weekday> {
        match self.weekly_summary_weekday {
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            7 => Some(Weekday::Sun),
            _ => None,
        }
    }
}

/// Everything the scheduler needs from the surrounding app at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub settings: Settings,
    pub people: Vec<Person>,
}

//=========================================================================================
// Planned notifications
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Daily,
    Weekly,
}

impl Channel {
    pub fn id(&self) -> &'static str {
        match self {
            Channel::Daily => "daily-reminders",
            Channel::Weekly => "weekly-summary",
        }
    }

    pub fn importance(&self) -> Importance {
        match self {
            Channel::Daily => Importance::High,
            Channel::Weekly => Importance::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Default,
    High,
}

/// Traces a planned notification back to what caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationMetadata {
    Daily {
        day: NaiveDate,
        person_ids: Vec<String>,
    },
    Weekly {
        anchor: DateTime<Utc>,
    },
}

/// A single notification the planner wants queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedNotification {
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub channel: Channel,
    pub metadata: NotificationMetadata,
}

/// How far ahead the planner looks, bounded by the host queue's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub days: u32,
    pub weeks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
}

impl Horizon {
    /// iOS keeps at most 64 pending local notifications, so it gets the shorter window.
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Ios => Self { days: 30, weeks: 6 },
            Platform::Android => Self { days: 60, weeks: 12 },
        }
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self::for_platform(Platform::Android)
    }
}

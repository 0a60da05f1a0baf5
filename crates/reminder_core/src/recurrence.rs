//! crates/reminder_core/src/recurrence.rs
//!
//! Yearly recurrence and age arithmetic over plain calendar dates.
//!
//! A recorded date is a `(year, month, day)` triple. It is never run through a
//! timezone-aware parser: the year is only used for ages and the month/day only
//! for recurrence, so a historical year can never shift the day.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("'{0}' is not a YYYY-MM-DD date")]
    Format(String),
    #[error("'{0}' has no valid month/day")]
    OutOfRange(String),
}

/// A recorded calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn parse(raw: &str) -> Result<Self, DateError> {
        let raw = raw.trim();
        let format_err = || DateError::Format(raw.to_string());

        // A leading '-' belongs to the year, so split from the right.
        let mut parts = raw.rsplitn(3, '-');
        let day = parts.next().ok_or_else(format_err)?;
        let month = parts.next().ok_or_else(format_err)?;
        let year = parts.next().ok_or_else(format_err)?;
        if year.is_empty() || month.len() != 2 || day.len() != 2 {
            return Err(format_err());
        }

        let year: i32 = year.parse().map_err(|_| format_err())?;
        let month: u32 = month.parse().map_err(|_| format_err())?;
        let day: u32 = day.parse().map_err(|_| format_err())?;

        // Check month/day against a leap year so Feb 29 is accepted for any year.
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(DateError::OutOfRange(raw.to_string()));
        }
        Ok(Self { year, month, day })
    }

    /// The day this date recurs on in `year`. Feb 29 falls back to Feb 28
    /// in non-leap years.
    pub fn occurrence_in(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day).or_else(|| {
            if self.month == 2 && self.day == 29 {
                NaiveDate::from_ymd_opt(year, 2, 28)
            } else {
                None
            }
        })
    }

    /// First recurrence on or after `from`.
    pub fn next_occurrence_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self.occurrence_in(from.year()) {
            Some(date) if date >= from => Some(date),
            _ => self.occurrence_in(from.year() + 1),
        }
    }

    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        self.occurrence_in(day.year()) == Some(day)
    }

    /// Completed years at `on`, never negative.
    ///
    /// A year is completed on the day the date recurs, so a Feb 29 date
    /// gains a year on Feb 28 in common years.
    pub fn age_on(&self, on: NaiveDate) -> u32 {
        let mut years = i64::from(on.year()) - i64::from(self.year);
        if !self.occurrence_in(on.year()).is_some_and(|day| on >= day) {
            years -= 1;
        }
        u32::try_from(years.max(0)).unwrap_or(u32::MAX)
    }
}

impl FromStr for CalendarDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Midday avoids the midnight instants that daylight-saving switches skip or repeat.
pub fn midday() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Resolves a wall-clock time in `tz`.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times inside
/// a spring-forward gap move one hour later.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&local).earliest().or_else(|| {
        let shifted = local.checked_add_signed(chrono::Duration::hours(1))?;
        tz.from_local_datetime(&shifted).earliest()
    })
}

/// Local midday of the next day, counting the reference day itself, on which
/// `date_iso` recurs. `None` if the date is malformed.
pub fn next_occurrence<Tz: TimeZone>(
    date_iso: &str,
    reference: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let recorded = CalendarDate::parse(date_iso).ok()?;
    let day = recorded.next_occurrence_date(reference.date_naive())?;
    resolve_local(&reference.timezone(), day.and_time(midday()))
}

/// Age (or anniversary count) at `at`. Malformed dates count as zero.
pub fn age_on<Tz: TimeZone>(date_iso: &str, at: &DateTime<Tz>) -> u32 {
    CalendarDate::parse(date_iso)
        .map(|recorded| recorded.age_on(at.date_naive()))
        .unwrap_or(0)
}

/// Whether `date_iso` recurs on `day`. Malformed dates never match.
pub fn occurs_on(date_iso: &str, day: NaiveDate) -> bool {
    CalendarDate::parse(date_iso)
        .map(|recorded| recorded.occurs_on(day))
        .unwrap_or(false)
}

/// Adds whole calendar days, keeping the wall-clock date semantics.
pub fn add_days(day: NaiveDate, n: u64) -> Option<NaiveDate> {
    day.checked_add_days(Days::new(n))
}

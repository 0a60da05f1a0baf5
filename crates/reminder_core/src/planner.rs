//! crates/reminder_core/src/planner.rs
//!
//! Computes every notification that should be queued within the horizon.
//!
//! The planner is a pure batch computation: identical settings, people and
//! `now` always produce the identical plan. It runs two independent passes,
//! one for same-day reminders and one for the weekly digest.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::composer;
use crate::domain::{
    Channel, Horizon, NotificationMetadata, Person, PlannedNotification, Settings,
};
use crate::recurrence::{add_days, occurs_on, resolve_local};

/// Plans both passes and returns them ordered by fire time.
pub fn plan<Tz: TimeZone>(
    settings: &Settings,
    people: &[Person],
    now: &DateTime<Tz>,
    horizon: Horizon,
) -> Vec<PlannedNotification> {
    let mut planned = plan_daily(settings, people, now, horizon.days);
    planned.extend(plan_weekly(settings, people, now, horizon.weeks));

    planned.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then(a.channel.cmp(&b.channel)));
    planned.dedup_by(|a, b| a.fire_at == b.fire_at && a.channel == b.channel);
    planned
}

//=========================================================================================
// Daily pass
//=========================================================================================

/// One reminder per upcoming day on which somebody with same-day reminders
/// enabled is celebrated.
pub fn plan_daily<Tz: TimeZone>(
    settings: &Settings,
    people: &[Person],
    now: &DateTime<Tz>,
    horizon_days: u32,
) -> Vec<PlannedNotification> {
    let Some(time) = settings.same_day_time() else {
        return Vec::new();
    };
    let tz = now.timezone();
    let today = now.date_naive();
    let mut planned = Vec::new();

    for offset in 0..u64::from(horizon_days) {
        let Some(day) = add_days(today, offset) else {
            break;
        };
        let Some(fire_at) = local_instant(&tz, day, time) else {
            continue;
        };
        if fire_at <= now.with_timezone(&Utc) {
            continue;
        }

        let celebrated: Vec<&Person> = people
            .iter()
            .filter(|p| p.wants_same_day_reminder() && occurs_on(&p.date_iso, day))
            .collect();
        if celebrated.is_empty() {
            continue;
        }
        let Some(body) = composer::build_daily_body(day, &celebrated, settings.locale) else {
            continue;
        };
        if body.trim().is_empty() {
            continue;
        }

        let mut person_ids: Vec<String> = celebrated.iter().map(|p| p.id.clone()).collect();
        person_ids.sort();
        planned.push(PlannedNotification {
            fire_at,
            title: composer::daily_title(settings.locale).to_string(),
            body,
            channel: Channel::Daily,
            metadata: NotificationMetadata::Daily { day, person_ids },
        });
    }
    planned
}

//=========================================================================================
// Weekly pass
//=========================================================================================

/// One digest per upcoming week that has at least one celebration in the
/// half-open window `[anchor day, anchor day + 7)`.
pub fn plan_weekly<Tz: TimeZone>(
    settings: &Settings,
    people: &[Person],
    now: &DateTime<Tz>,
    horizon_weeks: u32,
) -> Vec<PlannedNotification> {
    if !settings.weekly_summary_enabled {
        return Vec::new();
    }
    let Some(first_anchor_day) = first_anchor_day(settings, now) else {
        return Vec::new();
    };
    let Some(time) = settings.weekly_summary_time() else {
        return Vec::new();
    };
    let tz = now.timezone();
    let mut planned = Vec::new();

    for week in 0..u64::from(horizon_weeks) {
        let Some(anchor_day) = add_days(first_anchor_day, week * 7) else {
            break;
        };
        let Some(anchor) = local_instant(&tz, anchor_day, time) else {
            continue;
        };

        let in_window: Vec<&Person> = people
            .iter()
            .filter(|p| occurs_within_week(&p.date_iso, anchor_day))
            .collect();
        if in_window.is_empty() {
            continue;
        }
        let Some(body) = composer::build_weekly_body(anchor_day, &in_window, settings.locale)
        else {
            continue;
        };

        planned.push(PlannedNotification {
            fire_at: anchor,
            title: composer::weekly_title(settings.locale).to_string(),
            body,
            channel: Channel::Weekly,
            metadata: NotificationMetadata::Weekly { anchor },
        });
    }
    planned
}

/// First day, starting today, that has the configured weekday and whose
/// digest time is still strictly in the future.
fn first_anchor_day<Tz: TimeZone>(settings: &Settings, now: &DateTime<Tz>) -> Option<NaiveDate> {
    let weekday = settings.summary_weekday()?;
    let time = settings.weekly_summary_time()?;
    let tz = now.timezone();
    let now_utc = now.with_timezone(&Utc);
    let today = now.date_naive();

    // Today may match the weekday but already be past the time, so look one day further.
    (0..=7).find_map(|offset| {
        let day = add_days(today, offset)?;
        if day.weekday() != weekday {
            return None;
        }
        let anchor = local_instant(&tz, day, time)?;
        (anchor > now_utc).then_some(day)
    })
}

/// Window membership is decided per calendar day so the anchor's time-of-day
/// never moves a celebration across the boundary.
fn occurs_within_week(date_iso: &str, anchor_day: NaiveDate) -> bool {
    (0..7).any(|offset| add_days(anchor_day, offset).is_some_and(|day| occurs_on(date_iso, day)))
}

fn local_instant<Tz: TimeZone>(tz: &Tz, day: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    resolve_local(tz, day.and_time(time)).map(|instant| instant.with_timezone(&Utc))
}

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use reminder_core::composer::build_daily_body;
use reminder_core::{
    compute_signature, plan, Channel, Horizon, Locale, NotificationMetadata, OccasionKind, Person,
    PlannedNotification, Settings,
};

fn cest() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).unwrap()
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
    cest().with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn ann() -> Person {
    Person::new("ann", "Ann", OccasionKind::Birthday, "1990-06-15")
}

fn english() -> Settings {
    Settings {
        weekly_summary_enabled: false,
        same_day_hour: 9,
        same_day_minute: 0,
        locale: Locale::En,
        ..Settings::default()
    }
}

fn daily(plan: &[PlannedNotification]) -> Vec<&PlannedNotification> {
    plan.iter().filter(|n| n.channel == Channel::Daily).collect()
}

fn weekly(plan: &[PlannedNotification]) -> Vec<&PlannedNotification> {
    plan.iter().filter(|n| n.channel == Channel::Weekly).collect()
}

#[test]
fn reminder_fires_at_the_configured_time_on_the_day() {
    let planned = plan(&english(), &[ann()], &at(2024, 6, 15, 8, 0), Horizon::default());

    let daily = daily(&planned);
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].fire_at, at(2024, 6, 15, 9, 0).with_timezone(&Utc));
    assert!(daily[0].body.contains("Ann"));
    assert!(daily[0].body.contains("34"));
    assert_eq!(
        daily[0].metadata,
        NotificationMetadata::Daily {
            day: chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            person_ids: vec!["ann".to_string()],
        }
    );
}

#[test]
fn past_trigger_time_moves_to_next_year() {
    let horizon = Horizon { days: 366, weeks: 0 };
    let planned = plan(&english(), &[ann()], &at(2024, 6, 15, 9, 1), horizon);

    let daily = daily(&planned);
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].fire_at, at(2025, 6, 15, 9, 0).with_timezone(&Utc));
    assert!(daily[0].body.contains("35"));
}

#[test]
fn disabled_weekly_summary_emits_no_digest() {
    let people: Vec<Person> = (1..=28)
        .map(|d| {
            Person::new(
                d.to_string(),
                format!("P{}", d),
                OccasionKind::Birthday,
                format!("1980-06-{:02}", d),
            )
        })
        .collect();
    let planned = plan(&english(), &people, &at(2024, 6, 1, 8, 0), Horizon::default());
    assert!(weekly(&planned).is_empty());
    assert!(!daily(&planned).is_empty());
}

#[test]
fn two_people_on_one_day_share_one_notification() {
    let bob = Person::new("bob", "Bob", OccasionKind::Birthday, "1980-06-15");
    let planned = plan(
        &english(),
        &[ann(), bob.clone()],
        &at(2024, 6, 15, 8, 0),
        Horizon::default(),
    );

    let daily = daily(&planned);
    assert_eq!(daily.len(), 1);
    assert_eq!(
        daily[0].body,
        "Today we celebrate 🎂 Ann (turns 34) and 🎂 Bob (turns 44)."
    );

    let day = chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let nl = build_daily_body(day, &[&ann(), &bob], Locale::Nl).unwrap();
    assert!(nl.contains(" en "));
}

#[test]
fn planning_is_idempotent() {
    let settings = Settings { weekly_summary_enabled: true, ..english() };
    let people = vec![
        ann(),
        Person::new("bob", "Bob", OccasionKind::Anniversary, "2000-07-04"),
        Person::new("cy", "Cy", OccasionKind::Other, "1970-12-31"),
    ];
    let now = at(2024, 6, 10, 12, 0);
    let mut reversed = people.clone();
    reversed.reverse();

    let first = plan(&settings, &people, &now, Horizon::default());
    assert_eq!(first, plan(&settings, &people, &now, Horizon::default()));
    assert_eq!(first, plan(&settings, &reversed, &now, Horizon::default()));
    assert_eq!(
        compute_signature(&settings, &people),
        compute_signature(&settings, &reversed)
    );
}

#[test]
fn muted_person_is_left_out_until_reenabled() {
    let mut muted = ann();
    muted.same_day_reminder = Some(false);
    let bob = Person::new("bob", "Bob", OccasionKind::Birthday, "1980-06-15");
    let now = at(2024, 6, 1, 8, 0);

    let planned = plan(&english(), &[muted.clone(), bob.clone()], &now, Horizon::default());
    let daily_entries = daily(&planned);
    assert_eq!(daily_entries.len(), 1);
    assert!(!daily_entries[0].body.contains("Ann"));

    let mut only_muted = plan(&english(), &[muted.clone()], &now, Horizon::default());
    assert!(daily(&only_muted).is_empty());

    muted.same_day_reminder = Some(true);
    only_muted = plan(&english(), &[muted], &now, Horizon::default());
    let daily_entries = daily(&only_muted);
    assert_eq!(daily_entries.len(), 1);
    assert_eq!(daily_entries[0].fire_at, at(2024, 6, 15, 9, 0).with_timezone(&Utc));
}

#[test]
fn muted_person_still_appears_in_the_weekly_digest() {
    let mut muted = ann();
    muted.same_day_reminder = Some(false);
    let settings = Settings { weekly_summary_enabled: true, ..english() };

    let planned = plan(&settings, &[muted], &at(2024, 6, 10, 8, 0), Horizon::default());
    assert!(daily(&planned).is_empty());
    assert!(weekly(&planned).iter().any(|n| n.body.contains("Ann")));
}

#[test]
fn occurrence_on_the_window_end_belongs_to_the_next_week() {
    // Digest every Monday 09:00; 2024-06-17 and 2024-06-24 are Mondays.
    let settings = Settings {
        weekly_summary_enabled: true,
        weekly_summary_weekday: 1,
        weekly_summary_hour: 9,
        weekly_summary_minute: 0,
        ..english()
    };
    let edge = Person::new("edge", "Edge", OccasionKind::Birthday, "1990-06-24");
    let inside = Person::new("in", "Inside", OccasionKind::Birthday, "1990-06-23");
    let now = at(2024, 6, 16, 20, 0);

    let planned = plan(&settings, &[edge, inside], &now, Horizon { days: 0, weeks: 3 });
    let weekly = weekly(&planned);
    assert_eq!(weekly.len(), 2);

    let first_anchor = at(2024, 6, 17, 9, 0).with_timezone(&Utc);
    assert_eq!(weekly[0].fire_at, first_anchor);
    assert!(weekly[0].body.contains("Inside"));
    assert!(!weekly[0].body.contains("Edge"));

    assert_eq!(
        weekly[1].metadata,
        NotificationMetadata::Weekly { anchor: first_anchor + Duration::days(7) }
    );
    assert!(weekly[1].body.contains("Edge"));
    assert!(!weekly[1].body.contains("Inside"));
}

#[test]
fn nothing_is_planned_in_the_past() {
    let settings = Settings { weekly_summary_enabled: true, ..english() };
    let people: Vec<Person> = (1..=12)
        .map(|m| {
            Person::new(
                m.to_string(),
                format!("P{}", m),
                OccasionKind::Birthday,
                format!("1990-{:02}-10", m),
            )
        })
        .collect();
    let now = at(2024, 6, 10, 10, 0);

    let planned = plan(&settings, &people, &now, Horizon { days: 366, weeks: 53 });
    assert!(!planned.is_empty());
    assert!(planned.iter().all(|n| n.fire_at > now.with_timezone(&Utc)));
}

#[test]
fn leap_day_birthday_counts_the_year_on_feb_28() {
    let lea = Person::new("lea", "Lea", OccasionKind::Birthday, "2000-02-29");
    let planned = plan(&english(), &[lea], &at(2023, 2, 1, 8, 0), Horizon::default());

    let daily = daily(&planned);
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].fire_at, at(2023, 2, 28, 9, 0).with_timezone(&Utc));
    assert!(daily[0].body.contains("turns 23"), "{}", daily[0].body);
}

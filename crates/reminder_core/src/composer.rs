//! crates/reminder_core/src/composer.rs
//!
//! Builds the human-readable titles and bodies of reminder notifications.
//! Locale only changes wording, word order and date formatting; the grouping
//! and ordering of people is the same for every locale.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::domain::{Locale, OccasionKind, Person};
use crate::recurrence::{add_days, CalendarDate};

const DAYS_PER_WEEK: u64 = 7;

pub fn daily_title(locale: Locale) -> &'static str {
    match locale {
        Locale::Nl => "Vandaag te vieren 🎉",
        Locale::En => "Celebrations today 🎉",
    }
}

pub fn weekly_title(locale: Locale) -> &'static str {
    match locale {
        Locale::Nl => "Deze week te vieren 📅",
        Locale::En => "This week's celebrations 📅",
    }
}

/// Body of the same-day reminder for `day`, or `None` when nobody matches.
pub fn build_daily_body(day: NaiveDate, people: &[&Person], locale: Locale) -> Option<String> {
    let people = sorted(people);
    match people.as_slice() {
        [] => None,
        [person] => Some(single_sentence(person, day, locale)),
        many => {
            let names: Vec<String> = many.iter().map(|p| fragment(p, day, locale)).collect();
            let list = join_with_conjunction(&names, conjunction(locale));
            Some(match locale {
                Locale::Nl => format!("Vandaag vieren we {}.", list),
                Locale::En => format!("Today we celebrate {}.", list),
            })
        }
    }
}

/// Digest of the seven days starting at `week_start`, or `None` when nobody
/// in `people` recurs inside that window.
pub fn build_weekly_body(
    week_start: NaiveDate,
    people: &[&Person],
    locale: Locale,
) -> Option<String> {
    let people = sorted(people);
    let mut segments = Vec::new();

    for offset in 0..DAYS_PER_WEEK {
        let Some(day) = add_days(week_start, offset) else {
            break;
        };
        let names: Vec<String> = people
            .iter()
            .filter(|p| recurs_on(p, day))
            .map(|p| fragment(p, day, locale))
            .collect();
        if names.is_empty() {
            continue;
        }
        segments.push(format!(
            "{}: {}",
            format_day(day, locale),
            join_with_conjunction(&names, conjunction(locale))
        ));
    }

    if segments.is_empty() {
        return None;
    }
    let digest = segments.join("; ");
    Some(match locale {
        Locale::Nl => format!("Deze week: {}.", digest),
        Locale::En => format!("This week: {}.", digest),
    })
}

//=========================================================================================
// Helpers
//=========================================================================================

fn sorted<'a>(people: &[&'a Person]) -> Vec<&'a Person> {
    let mut people = people.to_vec();
    people.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    people
}

fn recurs_on(person: &Person, day: NaiveDate) -> bool {
    CalendarDate::parse(&person.date_iso)
        .map(|date| date.occurs_on(day))
        .unwrap_or(false)
}

/// Age or anniversary count on `day`; zero for malformed dates.
fn count_on(person: &Person, day: NaiveDate) -> u32 {
    CalendarDate::parse(&person.date_iso)
        .map(|date| date.age_on(day))
        .unwrap_or(0)
}

fn emoji(kind: OccasionKind) -> &'static str {
    match kind {
        OccasionKind::Birthday => "🎂",
        OccasionKind::Anniversary => "💍",
        OccasionKind::Other => "🎉",
    }
}

fn conjunction(locale: Locale) -> &'static str {
    match locale {
        Locale::Nl => "en",
        Locale::En => "and",
    }
}

fn label(person: &Person) -> Option<&str> {
    person
        .label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
}

/// "a, b and c"
fn join_with_conjunction(items: &[String], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} {} {}", init.join(", "), conjunction, last),
    }
}

/// One list entry, e.g. "🎂 Ann (turns 34)".
fn fragment(person: &Person, day: NaiveDate, locale: Locale) -> String {
    let count = count_on(person, day);
    let icon = emoji(person.kind);
    let detail = match (person.kind, locale) {
        (OccasionKind::Birthday, _) if count == 0 => None,
        (OccasionKind::Birthday, Locale::Nl) => Some(format!("wordt {}", count)),
        (OccasionKind::Birthday, Locale::En) => Some(format!("turns {}", count)),
        (OccasionKind::Anniversary, _) if count == 0 => None,
        (OccasionKind::Anniversary, Locale::Nl) => Some(format!("{} jaar", count)),
        (OccasionKind::Anniversary, Locale::En) => Some(format!("{} years", count)),
        (OccasionKind::Other, _) => label(person).map(str::to_string),
    };
    match detail {
        Some(detail) => format!("{} {} ({})", icon, person.name, detail),
        None => format!("{} {}", icon, person.name),
    }
}

/// The sentence used when exactly one person is celebrated.
fn single_sentence(person: &Person, day: NaiveDate, locale: Locale) -> String {
    let count = count_on(person, day);
    let name = &person.name;
    let icon = emoji(person.kind);
    match (person.kind, locale) {
        (OccasionKind::Birthday, Locale::Nl) if count == 0 => {
            format!("Vandaag is {} jarig! {}", name, icon)
        }
        (OccasionKind::Birthday, Locale::En) if count == 0 => {
            format!("Today is {}'s birthday! {}", name, icon)
        }
        (OccasionKind::Birthday, Locale::Nl) => {
            format!("Vandaag wordt {} {}! {}", name, count, icon)
        }
        (OccasionKind::Birthday, Locale::En) => format!("Today {} turns {}! {}", name, count, icon),
        (OccasionKind::Anniversary, Locale::Nl) if count == 0 => {
            format!("Vandaag is de trouwdag van {}! {}", name, icon)
        }
        (OccasionKind::Anniversary, Locale::En) if count == 0 => {
            format!("Today is {}'s anniversary! {}", name, icon)
        }
        (OccasionKind::Anniversary, Locale::Nl) => {
            format!("Vandaag vieren {} hun {}-jarig jubileum! {}", name, count, icon)
        }
        (OccasionKind::Anniversary, Locale::En) => {
            format!("Today {} celebrate {} years together! {}", name, count, icon)
        }
        (OccasionKind::Other, Locale::Nl) => match label(person) {
            Some(label) => format!("Vandaag: {} van {}! {}", label, name, icon),
            None => format!("Vandaag is een bijzondere dag voor {}! {}", name, icon),
        },
        (OccasionKind::Other, Locale::En) => match label(person) {
            Some(label) => format!("Today is {}'s {}! {}", name, label, icon),
            None => format!("Today is a special day for {}! {}", name, icon),
        },
    }
}

/// "Mon Jun 17" / "ma 17 jun"
fn format_day(day: NaiveDate, locale: Locale) -> String {
    let month = day.month0() as usize;
    match locale {
        Locale::Nl => {
            const MONTHS: [&str; 12] = [
                "jan", "feb", "mrt", "apr", "mei", "jun", "jul", "aug", "sep", "okt", "nov", "dec",
            ];
            let weekday = match day.weekday() {
                Weekday::Mon => "ma",
                Weekday::Tue => "di",
                Weekday::Wed => "wo",
                Weekday::Thu => "do",
                Weekday::Fri => "vr",
                Weekday::Sat => "za",
                Weekday::Sun => "zo",
            };
            format!("{} {} {}", weekday, day.day(), MONTHS[month])
        }
        Locale::En => {
            const MONTHS: [&str; 12] = [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ];
            let weekday = match day.weekday() {
                Weekday::Mon => "Mon",
                Weekday::Tue => "Tue",
                Weekday::Wed => "Wed",
                Weekday::Thu => "Thu",
                Weekday::Fri => "Fri",
                Weekday::Sat => "Sat",
                Weekday::Sun => "Sun",
            };
            format!("{} {} {}", weekday, MONTHS[month], day.day())
        }
    }
}

//! crates/reminder_core/src/signature.rs
//!
//! Fingerprint of everything that influences the notification plan, used to
//! tell whether a reconciliation is needed at all.

use sha2::{Digest, Sha256};

use crate::domain::{Person, Settings};

/// Opaque fingerprint; only equality is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationSignature(String);

impl NotificationSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NotificationSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The first 12 hex chars are plenty for log lines.
        f.write_str(&self.0[..self.0.len().min(12)])
    }
}

/// SHA-256 over a canonical encoding of `settings` and `people`.
///
/// People are sorted first, so their iteration order never changes the result.
pub fn compute_signature(settings: &Settings, people: &[Person]) -> NotificationSignature {
    let mut hasher = Sha256::new();

    write_field(&mut hasher, if settings.weekly_summary_enabled { "1" } else { "0" });
    for value in [
        settings.weekly_summary_weekday,
        settings.weekly_summary_hour,
        settings.weekly_summary_minute,
        settings.same_day_hour,
        settings.same_day_minute,
    ] {
        write_field(&mut hasher, &value.to_string());
    }
    write_field(&mut hasher, settings.locale.as_str());

    let mut encoded: Vec<String> = people.iter().map(encode_person).collect();
    encoded.sort();
    write_field(&mut hasher, &encoded.len().to_string());
    for person in &encoded {
        write_field(&mut hasher, person);
    }

    NotificationSignature(hex::encode(hasher.finalize()))
}

fn encode_person(person: &Person) -> String {
    let same_day = match person.same_day_reminder {
        None => "-",
        Some(true) => "1",
        Some(false) => "0",
    };
    // Presence and value are separate fields so `None` never equals any label.
    let (has_label, label) = match person.label.as_deref() {
        None => ("0", ""),
        Some(label) => ("1", label),
    };
    let fields = [
        person.id.as_str(),
        person.name.as_str(),
        person.kind.as_str(),
        person.date_iso.as_str(),
        has_label,
        label,
        same_day,
    ];
    fields
        .iter()
        .map(|f| format!("{}:{}", f.len(), f))
        .collect::<Vec<_>>()
        .concat()
}

/// Length-prefixed so that no two field sequences encode to the same bytes.
fn write_field(hasher: &mut Sha256, value: &str) {
    hasher.update(value.len().to_string().as_bytes());
    hasher.update(b":");
    hasher.update(value.as_bytes());
}

//! services/notifier/src/adapters/snapshot.rs
//!
//! Reads the people + settings snapshot the app exports as a JSON file, and
//! implements the `SnapshotSource` port from the `core` crate. The watcher turns
//! file changes into a stream of snapshots for the reconciliation trigger.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use futures::Stream;
use reminder_core::domain::{Locale, OccasionKind, Person, Settings, Snapshot};
use reminder_core::ports::{PortError, PortResult, SnapshotSource};
use serde::Deserialize;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that loads `Snapshot`s from a JSON file on disk.
#[derive(Clone, Debug)]
pub struct JsonSnapshotSource {
    path: PathBuf,
}

impl JsonSnapshotSource {
    /// Creates a new `JsonSnapshotSource`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Polls the file every `interval` and yields a snapshot whenever its
    /// content differs from the last one yielded. The first successful read is
    /// always yielded. Unreadable or invalid content is logged and skipped.
    pub fn watch(self, interval: Duration) -> impl Stream<Item = Snapshot> {
        stream! {
            let mut ticker = tokio::time::interval(interval);
            let mut last_raw: Option<String> = None;
            loop {
                ticker.tick().await;
                let raw = match tokio::fs::read_to_string(&self.path).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        warn!("Could not read snapshot {}: {}", self.path.display(), e);
                        continue;
                    }
                };
                if last_raw.as_deref() == Some(raw.as_str()) {
                    continue;
                }
                match parse_snapshot(&raw) {
                    Ok(snapshot) => {
                        debug!("Snapshot file changed ({} people).", snapshot.people.len());
                        last_raw = Some(raw);
                        yield snapshot;
                    }
                    Err(e) => {
                        warn!("Ignoring invalid snapshot {}: {}", self.path.display(), e);
                        last_raw = Some(raw);
                    }
                }
            }
        }
    }
}

//=========================================================================================
// `SnapshotSource` Trait Implementation
//=========================================================================================

#[async_trait]
impl SnapshotSource for JsonSnapshotSource {
    async fn load_snapshot(&self) -> PortResult<Snapshot> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| PortError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        parse_snapshot(&raw).map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

/// Decodes the exported JSON document into core types.
pub fn parse_snapshot(raw: &str) -> Result<Snapshot, serde_json::Error> {
    let record: SnapshotRecord = serde_json::from_str(raw)?;
    Ok(record.to_domain())
}

//=========================================================================================
// "Impure" File Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct SnapshotRecord {
    #[serde(default)]
    settings: SettingsRecord,
    #[serde(default)]
    people: Vec<PersonRecord>,
}
impl SnapshotRecord {
    fn to_domain(self) -> Snapshot {
        Snapshot {
            settings: self.settings.to_domain(),
            people: self.people.into_iter().map(PersonRecord::to_domain).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: KindRecord,
    #[serde(rename = "dateISO")]
    date_iso: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    same_day_reminder: Option<bool>,
}
impl PersonRecord {
    fn to_domain(self) -> Person {
        Person {
            id: self.id,
            name: self.name,
            kind: match self.kind {
                KindRecord::Birthday => OccasionKind::Birthday,
                KindRecord::Anniversary => OccasionKind::Anniversary,
                KindRecord::Other => OccasionKind::Other,
            },
            date_iso: self.date_iso,
            label: self.label,
            same_day_reminder: self.same_day_reminder,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum KindRecord {
    Birthday,
    Anniversary,
    Other,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum LocaleRecord {
    Nl,
    En,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SettingsRecord {
    weekly_summary_enabled: bool,
    weekly_summary_weekday: u32,
    weekly_summary_hour: u32,
    weekly_summary_minute: u32,
    same_day_hour: u32,
    same_day_minute: u32,
    locale: LocaleRecord,
}
impl Default for SettingsRecord {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            weekly_summary_enabled: settings.weekly_summary_enabled,
            weekly_summary_weekday: settings.weekly_summary_weekday,
            weekly_summary_hour: settings.weekly_summary_hour,
            weekly_summary_minute: settings.weekly_summary_minute,
            same_day_hour: settings.same_day_hour,
            same_day_minute: settings.same_day_minute,
            locale: match settings.locale {
                Locale::Nl => LocaleRecord::Nl,
                Locale::En => LocaleRecord::En,
            },
        }
    }
}
impl SettingsRecord {
    fn to_domain(self) -> Settings {
        Settings {
            weekly_summary_enabled: self.weekly_summary_enabled,
            weekly_summary_weekday: self.weekly_summary_weekday,
            weekly_summary_hour: self.weekly_summary_hour,
            weekly_summary_minute: self.weekly_summary_minute,
            same_day_hour: self.same_day_hour,
            same_day_minute: self.same_day_minute,
            locale: match self.locale {
                LocaleRecord::Nl => Locale::Nl,
                LocaleRecord::En => Locale::En,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Write;

    const EXPORT: &str = r#"{
        "settings": {
            "weeklySummaryEnabled": false,
            "weeklySummaryWeekday": 5,
            "sameDayHour": 8,
            "sameDayMinute": 30,
            "locale": "en"
        },
        "people": [
            { "id": "a1", "name": "Ann", "type": "birthday", "dateISO": "1990-06-15" },
            { "id": "b2", "name": "Bob & Carol", "type": "anniversary", "dateISO": "2014-09-01",
              "sameDayReminder": false },
            { "id": "c3", "name": "Dan", "type": "other", "dateISO": "1975-11-02", "label": "name day" }
        ]
    }"#;

    #[test]
    fn parses_the_app_export() {
        let snapshot = parse_snapshot(EXPORT).unwrap();
        assert!(!snapshot.settings.weekly_summary_enabled);
        assert_eq!(snapshot.settings.weekly_summary_weekday, 5);
        // Missing fields fall back to the defaults.
        assert_eq!(snapshot.settings.weekly_summary_hour, 9);
        assert_eq!(snapshot.settings.same_day_minute, 30);
        assert_eq!(snapshot.settings.locale, Locale::En);

        assert_eq!(snapshot.people.len(), 3);
        assert_eq!(snapshot.people[0].same_day_reminder, None);
        assert_eq!(snapshot.people[1].kind, OccasionKind::Anniversary);
        assert_eq!(snapshot.people[1].same_day_reminder, Some(false));
        assert_eq!(snapshot.people[2].label.as_deref(), Some("name day"));
    }

    #[test]
    fn empty_document_is_the_default_snapshot() {
        assert_eq!(parse_snapshot("{}").unwrap(), Snapshot::default());
    }

    #[test]
    fn rejects_unknown_kinds() {
        let raw = r#"{ "people": [ { "id": "x", "name": "X", "type": "wedding", "dateISO": "2000-01-01" } ] }"#;
        assert!(parse_snapshot(raw).is_err());
    }

    #[tokio::test]
    async fn loads_through_the_port() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();

        let source = JsonSnapshotSource::new(file.path());
        let snapshot = source.load_snapshot().await.unwrap();
        assert_eq!(snapshot.people.len(), 3);

        let missing = JsonSnapshotSource::new(file.path().with_extension("missing"));
        assert!(matches!(
            missing.load_snapshot().await,
            Err(PortError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn watch_yields_only_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders.json");
        std::fs::write(&path, EXPORT).unwrap();

        let stream = JsonSnapshotSource::new(&path).watch(Duration::from_millis(10));
        futures::pin_mut!(stream);

        let first = stream.next().await.unwrap();
        assert_eq!(first.people.len(), 3);

        std::fs::write(&path, r#"{ "people": [] }"#).unwrap();
        let second = stream.next().await.unwrap();
        assert!(second.people.is_empty());
    }
}

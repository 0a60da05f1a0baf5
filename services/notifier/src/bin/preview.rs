//! services/notifier/src/bin/preview.rs
//!
//! This binary prints the notification plan for the configured snapshot as
//! JSON, without touching any notification queue.

use chrono::Local;
use notifier_lib::{adapters::JsonSnapshotSource, config::Config, error::NotifierError};
use reminder_core::domain::{NotificationMetadata, PlannedNotification};
use reminder_core::planner;
use reminder_core::ports::SnapshotSource;
use serde_json::{json, Value};

fn to_json(entry: &PlannedNotification) -> Value {
    let metadata = match &entry.metadata {
        NotificationMetadata::Daily { day, person_ids } => {
            json!({ "type": "daily", "day": day.to_string(), "personIds": person_ids })
        }
        NotificationMetadata::Weekly { anchor } => {
            json!({ "type": "weekly", "anchor": anchor.to_rfc3339() })
        }
    };
    json!({
        "fireAt": entry.fire_at.with_timezone(&Local).to_rfc3339(),
        "channel": entry.channel.id(),
        "title": entry.title,
        "body": entry.body,
        "metadata": metadata,
    })
}

#[tokio::main]
async fn main() -> Result<(), NotifierError> {
    let config = Config::from_env_requiring_snapshot()?;
    let snapshot = JsonSnapshotSource::new(&config.snapshot_path)
        .load_snapshot()
        .await?;

    let plan = planner::plan(
        &snapshot.settings,
        &snapshot.people,
        &Local::now(),
        config.horizon,
    );
    let entries: Vec<Value> = plan.iter().map(to_json).collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

use std::path::Path;

use odo_core::models::SyncSettingsUpdate;
use serde::Serialize;

use crate::commands::common::{
    build_coordinator, format_sync_conflict_lines, format_sync_timestamp, load_config, open_store,
    sync_conflict_to_item, SyncConflictItem,
};
use crate::error::CliError;

pub async fn run_sync(db_path: &Path) -> Result<(), CliError> {
    let config = load_config()?;
    let store = open_store(db_path)?;
    let coordinator = build_coordinator(store, &config)?;

    let report = coordinator.bidirectional_sync().await?;

    if report.push.success {
        println!("Pushed {} record(s)", report.push.pushed);
    } else {
        println!(
            "Push failed: {}",
            report.push.error.as_deref().unwrap_or("unknown error")
        );
    }
    if report.pull.success {
        println!("Pulled {} record(s)", report.pull.pulled);
    } else {
        println!(
            "Pull failed: {}",
            report.pull.error.as_deref().unwrap_or("unknown error")
        );
    }

    if report.success() {
        Ok(())
    } else {
        Err(CliError::Core(odo_core::Error::Remote(
            "sync did not fully complete; local data is unchanged and queued edits were kept"
                .to_string(),
        )))
    }
}

pub async fn run_sync_push(db_path: &Path) -> Result<(), CliError> {
    let config = load_config()?;
    let store = open_store(db_path)?;
    let coordinator = build_coordinator(store, &config)?;

    let result = coordinator.sync_to_backend().await?;
    if result.success {
        println!("Pushed {} record(s)", result.pushed);
        Ok(())
    } else {
        Err(CliError::Core(odo_core::Error::Remote(
            result.error.unwrap_or_else(|| "push failed".to_string()),
        )))
    }
}

pub async fn run_sync_pull(db_path: &Path) -> Result<(), CliError> {
    let config = load_config()?;
    let store = open_store(db_path)?;
    let coordinator = build_coordinator(store, &config)?;

    let result = coordinator.sync_from_backend().await?;
    if result.success {
        println!("Pulled {} record(s)", result.pulled);
        Ok(())
    } else {
        Err(CliError::Core(odo_core::Error::Remote(
            result.error.unwrap_or_else(|| "pull failed".to_string()),
        )))
    }
}

pub fn run_sync_conflicts(
    limit: usize,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let conflicts = store.recent_conflicts(limit)?;

    if as_json {
        let json_items = conflicts
            .iter()
            .map(sync_conflict_to_item)
            .collect::<Vec<SyncConflictItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No sync conflicts recorded.");
        return Ok(());
    }
    for line in format_sync_conflict_lines(&conflicts) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_sync_watch(interval_secs: u64, db_path: &Path) -> Result<(), CliError> {
    let config = load_config()?;
    let store = open_store(db_path)?;
    store.update_sync_settings(&SyncSettingsUpdate {
        auto_sync_enabled: None,
        auto_sync_interval_secs: Some(interval_secs),
    })?;

    let coordinator = build_coordinator(store, &config)?;
    coordinator.set_auto_sync_enabled(true)?;
    let mut status_rx = coordinator.subscribe();

    println!("Watching; syncing every {interval_secs}s. Press Ctrl-C to stop.");
    loop {
        tokio::select! {
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = *status_rx.borrow_and_update();
                println!(
                    "queued={}  processing={}  last_sync={}",
                    status.queue_len,
                    status.is_processing,
                    status
                        .last_sync_time
                        .map_or_else(|| "never".to_string(), format_sync_timestamp)
                );
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    coordinator.set_auto_sync_enabled(false)?;
    Ok(())
}

pub fn run_sync_auto(state: &str, db_path: &Path) -> Result<(), CliError> {
    let enabled = state == "on";
    let store = open_store(db_path)?;
    let settings = store.update_sync_settings(&SyncSettingsUpdate {
        auto_sync_enabled: Some(enabled),
        auto_sync_interval_secs: None,
    })?;

    if settings.auto_sync_enabled {
        println!(
            "Auto-sync enabled (every {}s)",
            settings.auto_sync_interval_secs
        );
    } else {
        println!("Auto-sync disabled");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    queue_len: usize,
    auto_sync_enabled: bool,
    auto_sync_interval_secs: u64,
    last_sync_time: Option<i64>,
    last_sync_time_iso: Option<String>,
    employees: usize,
    mileage_entries: usize,
    receipts: usize,
}

pub fn run_status(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let config = load_config()?;
    let store = open_store(db_path)?;
    let settings = store.load_sync_settings()?;
    let counts = store.counts()?;

    let last_sync_time = config
        .employee_id
        .as_deref()
        .and_then(|raw| raw.parse::<odo_core::EmployeeId>().ok())
        .and_then(|employee_id| store.last_sync_time(employee_id).ok().flatten());

    let output = StatusOutput {
        queue_len: store.queue_len()?,
        auto_sync_enabled: settings.auto_sync_enabled,
        auto_sync_interval_secs: settings.auto_sync_interval_secs,
        last_sync_time,
        last_sync_time_iso: last_sync_time.map(format_sync_timestamp),
        employees: counts.employees,
        mileage_entries: counts.mileage_entries,
        receipts: counts.receipts,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Pending queue:   {}", output.queue_len);
    println!(
        "Auto-sync:       {} (every {}s)",
        if output.auto_sync_enabled { "on" } else { "off" },
        output.auto_sync_interval_secs
    );
    println!(
        "Last sync:       {}",
        output
            .last_sync_time_iso
            .as_deref()
            .unwrap_or("never")
    );
    println!(
        "Local records:   {} mileage, {} receipts, {} employee(s)",
        output.mileage_entries, output.receipts, output.employees
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_auto_persists_setting() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("odo.db");

        run_sync_auto("on", &db_path).unwrap();
        let store = open_store(&db_path).unwrap();
        assert!(store.load_sync_settings().unwrap().auto_sync_enabled);
        drop(store);

        run_sync_auto("off", &db_path).unwrap();
        let store = open_store(&db_path).unwrap();
        assert!(!store.load_sync_settings().unwrap().auto_sync_enabled);
    }

    #[test]
    fn test_sync_conflicts_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("odo.db");

        run_sync_conflicts(10, false, &db_path).unwrap();
        run_sync_conflicts(10, true, &db_path).unwrap();
    }
}

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use odo_core::db::SyncConflict;
use odo_core::export::format_amount;
use odo_core::models::{EmployeeId, EmployeeProfile, RecordType, SyncRecord};
use odo_core::remote::{HttpRemoteClient, RemoteClient};
use odo_core::services::StoreService;
use odo_core::sync::SyncCoordinator;
use serde::Serialize;

use crate::config_file::CliConfig;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct RecordListItem {
    pub id: String,
    pub record_type: String,
    pub date: Option<String>,
    pub summary: String,
    pub updated_at: i64,
    pub relative_time: String,
    pub is_deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct SyncConflictItem {
    pub id: i64,
    pub record_type: String,
    pub record_id: String,
    pub local_updated_at: i64,
    pub incoming_updated_at: i64,
    pub resolved_at: i64,
    pub resolved_at_iso: String,
    pub strategy: String,
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path {
        return Ok(path);
    }
    if let Some(path) = env::var_os("ODO_DB_PATH") {
        return Ok(PathBuf::from(path));
    }
    default_db_path()
}

fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("odo").join("odo.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

pub fn open_store(db_path: &Path) -> Result<StoreService, CliError> {
    Ok(StoreService::open_path(db_path)?)
}

pub fn load_config() -> Result<CliConfig, CliError> {
    CliConfig::load().map_err(CliError::Config)
}

/// Employee ID that new records are created under
pub fn resolve_employee_id(config: &CliConfig) -> Result<EmployeeId, CliError> {
    let raw = config.employee_id.as_deref().ok_or(CliError::NoEmployee)?;
    raw.parse::<EmployeeId>().map_err(|_| {
        CliError::Config(format!("Configured employee ID '{raw}' is not a valid ID"))
    })
}

pub fn resolve_employee(
    store: &StoreService,
    config: &CliConfig,
) -> Result<EmployeeProfile, CliError> {
    let employee_id = resolve_employee_id(config)?;
    store.get_employee(employee_id)?.ok_or(CliError::NoEmployee)
}

pub fn build_remote(config: &CliConfig) -> Result<Arc<dyn RemoteClient>, CliError> {
    let url = config
        .resolved_remote_url()
        .ok_or(CliError::SyncNotConfigured)?;
    let client = HttpRemoteClient::new(url, config.resolved_auth_token())?;
    Ok(Arc::new(client))
}

pub fn build_coordinator(
    store: StoreService,
    config: &CliConfig,
) -> Result<SyncCoordinator, CliError> {
    let employee_id = resolve_employee_id(config)?;
    let remote = build_remote(config)?;
    Ok(SyncCoordinator::new(store, remote, employee_id)?)
}

/// Parse a date argument: `today` or `YYYY-MM-DD`
pub fn parse_date_arg(raw: &str) -> Result<NaiveDate, CliError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("today") {
        return Ok(Utc::now().date_naive());
    }
    trimmed
        .parse::<NaiveDate>()
        .map_err(|_| CliError::InvalidDate(raw.to_string()))
}

/// Parse a dollar amount like `12.50` into cents
pub fn parse_amount_cents(raw: &str) -> Result<i64, CliError> {
    let trimmed = raw.trim().trim_start_matches('$');
    let invalid = || CliError::InvalidAmount(raw.to_string());

    let (dollars_part, cents_part) = match trimmed.split_once('.') {
        Some((dollars, cents)) => (dollars, cents),
        None => (trimmed, ""),
    };

    let dollars: i64 = if dollars_part.is_empty() {
        0
    } else {
        dollars_part.parse().map_err(|_| invalid())?
    };
    if dollars < 0 {
        return Err(invalid());
    }

    let cents: i64 = match cents_part.len() {
        0 => 0,
        1 => cents_part.parse::<i64>().map_err(|_| invalid())? * 10,
        2 => cents_part.parse().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    if cents < 0 {
        return Err(invalid());
    }

    Ok(dollars * 100 + cents)
}

pub fn parse_record_type(raw: &str) -> Result<RecordType, CliError> {
    raw.trim()
        .parse::<RecordType>()
        .map_err(|_| CliError::UnknownRecordType(raw.to_string()))
}

pub fn normalize_record_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyRecordId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn record_to_list_item(record: &SyncRecord) -> RecordListItem {
    let now_ms = Utc::now().timestamp_millis();
    let (date, summary, is_deleted) = match record {
        SyncRecord::DailyDescription(r) => {
            (Some(r.date.to_string()), summarize(&r.body, 60), r.is_deleted)
        }
        SyncRecord::MileageEntry(r) => (
            Some(r.date.to_string()),
            format!("{:.1} mi  {} -> {}", r.miles, r.from_location, r.to_location),
            r.is_deleted,
        ),
        SyncRecord::Receipt(r) => (
            Some(r.date.to_string()),
            format!("{}  {}", format_amount(r.amount_cents), r.vendor),
            r.is_deleted,
        ),
        SyncRecord::EmployeeProfile(r) => {
            (None, format!("{} <{}>", r.name, r.email), false)
        }
    };

    RecordListItem {
        id: record.record_id(),
        record_type: record.record_type().to_string(),
        date,
        summary,
        updated_at: record.updated_at(),
        relative_time: format_relative_time(record.updated_at(), now_ms),
        is_deleted,
    }
}

pub fn format_record_lines(records: &[SyncRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let item = record_to_list_item(record);
            let short_id = item.id.chars().take(13).collect::<String>();
            let date = item.date.unwrap_or_else(|| "-".repeat(10));
            let deleted = if item.is_deleted { "  [deleted]" } else { "" };

            format!(
                "{short_id:<13}  {:<18}  {date}  {:<40}  {}{deleted}",
                item.record_type, item.summary, item.relative_time
            )
        })
        .collect()
}

fn summarize(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn sync_conflict_to_item(conflict: &SyncConflict) -> SyncConflictItem {
    SyncConflictItem {
        id: conflict.id,
        record_type: conflict.record_type.clone(),
        record_id: conflict.record_id.clone(),
        local_updated_at: conflict.local_updated_at,
        incoming_updated_at: conflict.incoming_updated_at,
        resolved_at: conflict.resolved_at,
        resolved_at_iso: format_sync_timestamp(conflict.resolved_at),
        strategy: conflict.strategy.clone(),
    }
}

pub fn format_sync_conflict_lines(conflicts: &[SyncConflict]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            format!(
                "{}  {:<4}  {}={}  local={} incoming={}",
                format_sync_timestamp(conflict.resolved_at),
                conflict.strategy,
                conflict.record_type,
                conflict.record_id,
                conflict.local_updated_at,
                conflict.incoming_updated_at
            )
        })
        .collect()
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odo_core::models::{MileageEntry, Receipt};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_date_arg() {
        assert_eq!(
            parse_date_arg("2024-03-01").unwrap(),
            "2024-03-01".parse::<NaiveDate>().unwrap()
        );
        assert_eq!(parse_date_arg("today").unwrap(), Utc::now().date_naive());
        assert!(matches!(
            parse_date_arg("03/01/2024"),
            Err(CliError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_amount_cents() {
        assert_eq!(parse_amount_cents("12.50").unwrap(), 1_250);
        assert_eq!(parse_amount_cents("$12.5").unwrap(), 1_250);
        assert_eq!(parse_amount_cents("7").unwrap(), 700);
        assert_eq!(parse_amount_cents(".99").unwrap(), 99);
        assert!(parse_amount_cents("-3.00").is_err());
        assert!(parse_amount_cents("12.505").is_err());
        assert!(parse_amount_cents("lunch").is_err());
    }

    #[test]
    fn test_parse_record_type_rejects_unknown() {
        assert_eq!(
            parse_record_type(" receipt ").unwrap(),
            RecordType::Receipt
        );
        assert!(matches!(
            parse_record_type("journal"),
            Err(CliError::UnknownRecordType(_))
        ));
    }

    #[test]
    fn test_normalize_record_identifier_rejects_empty() {
        assert!(matches!(
            normalize_record_identifier(" \n "),
            Err(CliError::EmptyRecordId)
        ));
        assert_eq!(normalize_record_identifier("  abc  ").unwrap(), "abc");
    }

    #[test]
    fn test_format_relative_time_units() {
        let now = 10_000_000;
        assert_eq!(format_relative_time(now - 30_000, now), "just now");
        assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
        assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    }

    #[test]
    fn test_record_to_list_item_summaries() {
        let employee = EmployeeId::new();
        let date = "2024-03-01".parse().unwrap();

        let mut entry = MileageEntry::new(employee, date, 12.5);
        entry.from_location = "Office".to_string();
        entry.to_location = "Site".to_string();
        let item = record_to_list_item(&SyncRecord::MileageEntry(entry));
        assert_eq!(item.summary, "12.5 mi  Office -> Site");
        assert_eq!(item.record_type, "mileage_entry");

        let mut receipt = Receipt::new(employee, date, 1_299);
        receipt.vendor = "Diner".to_string();
        let item = record_to_list_item(&SyncRecord::Receipt(receipt));
        assert_eq!(item.summary, "$12.99  Diner");
    }
}

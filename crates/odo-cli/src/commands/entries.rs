use std::path::Path;

use odo_core::models::{MileageEntry, Receipt};

use crate::commands::common::{
    load_config, normalize_record_identifier, open_store, parse_amount_cents, parse_date_arg,
    parse_record_type, resolve_employee,
};
use crate::error::CliError;

pub fn run_log(date: &str, text_parts: &[String], db_path: &Path) -> Result<(), CliError> {
    let config = load_config()?;
    let date = parse_date_arg(date)?;
    let store = open_store(db_path)?;
    let employee = resolve_employee(&store, &config)?;

    let saved = store.save_daily_description(employee.id, date, text_parts.join(" "))?;
    println!("{}", saved.id);
    Ok(())
}

pub fn run_mileage_add(
    date: &str,
    miles: f64,
    from: &str,
    to: &str,
    purpose: &str,
    db_path: &Path,
) -> Result<(), CliError> {
    let config = load_config()?;
    let date = parse_date_arg(date)?;
    let store = open_store(db_path)?;
    let employee = resolve_employee(&store, &config)?;

    let mut entry = MileageEntry::new(employee.id, date, miles);
    entry.from_location = from.trim().to_string();
    entry.to_location = to.trim().to_string();
    entry.purpose = purpose.trim().to_string();

    store.add_mileage_entry(&entry)?;
    println!("{}", entry.id);
    Ok(())
}

pub fn run_receipt_add(
    date: &str,
    amount: &str,
    vendor: &str,
    category: &str,
    note: &str,
    db_path: &Path,
) -> Result<(), CliError> {
    let config = load_config()?;
    let date = parse_date_arg(date)?;
    let amount_cents = parse_amount_cents(amount)?;
    let store = open_store(db_path)?;
    let employee = resolve_employee(&store, &config)?;

    let mut receipt = Receipt::new(employee.id, date, amount_cents);
    receipt.vendor = vendor.trim().to_string();
    receipt.category = category.trim().to_string();
    receipt.note = note.trim().to_string();

    store.add_receipt(&receipt)?;
    println!("{}", receipt.id);
    Ok(())
}

pub fn run_delete(record_type: &str, id: &str, db_path: &Path) -> Result<(), CliError> {
    let record_type = parse_record_type(record_type)?;
    let record_id = normalize_record_identifier(id)?;
    let store = open_store(db_path)?;

    store.delete_record(record_type, &record_id)?;
    println!("{record_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use odo_core::models::{RecordType, SyncRecord};
    use odo_core::services::StoreService;

    #[test]
    fn test_delete_soft_deletes_and_enqueues() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("odo.db");

        let store = StoreService::open_path(&db_path).unwrap();
        let employee = odo_core::EmployeeId::new();
        let receipt = Receipt::new(employee, "2024-03-01".parse().unwrap(), 500);
        store.add_receipt(&receipt).unwrap();
        drop(store);

        run_delete("receipt", &receipt.id.as_str(), &db_path).unwrap();

        let store = StoreService::open_path(&db_path).unwrap();
        let reloaded = store
            .get_record(RecordType::Receipt, &receipt.id.as_str())
            .unwrap()
            .unwrap();
        match reloaded {
            SyncRecord::Receipt(r) => assert!(r.is_deleted),
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn test_delete_rejects_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("odo.db");

        let error = run_delete("journal", "some-id", &db_path).unwrap_err();
        assert!(matches!(error, CliError::UnknownRecordType(_)));
    }
}

use std::path::Path;

use crate::commands::common::{
    format_record_lines, load_config, open_store, record_to_list_item, resolve_employee_id,
    RecordListItem,
};
use crate::error::CliError;

pub fn run_list(include_deleted: bool, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let config = load_config()?;
    let store = open_store(db_path)?;
    let employee_id = resolve_employee_id(&config)?;
    let records = store.records_for_employee(employee_id, include_deleted)?;

    if as_json {
        let items = records
            .iter()
            .map(record_to_list_item)
            .collect::<Vec<RecordListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records yet.");
        return Ok(());
    }
    for line in format_record_lines(&records) {
        println!("{line}");
    }
    Ok(())
}

use std::path::Path;

use odo_core::export::{render_records_export, ExportFormat};

use crate::cli;
use crate::commands::common::{load_config, open_store, resolve_employee_id};
use crate::error::CliError;

const fn to_core_format(format: cli::ExportFormat) -> ExportFormat {
    match format {
        cli::ExportFormat::Json => ExportFormat::Json,
        cli::ExportFormat::Markdown => ExportFormat::Markdown,
    }
}

pub fn run_export(
    format: cli::ExportFormat,
    output_path: Option<&Path>,
    db_path: &Path,
) -> Result<(), CliError> {
    let config = load_config()?;
    let store = open_store(db_path)?;
    let employee_id = resolve_employee_id(&config)?;

    let records = store.records_for_employee(employee_id, false)?;
    let rendered = render_records_export(&records, to_core_format(format))?;

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

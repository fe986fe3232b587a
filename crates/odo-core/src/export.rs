//! Shared record export helpers used by every client surface.
//!
//! Output is deterministic for a given record slice: callers pass records in
//! store order (profile first, then type / date / id) and renderers never
//! reorder them.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::SyncRecord;

/// Export output format shared by all clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Render records as pretty-printed JSON.
pub fn render_json_export(records: &[SyncRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Render records as a Markdown expense report.
///
/// One section per record kind, rows in store order, with mileage and
/// expense totals at the end.
#[must_use]
pub fn render_markdown_export(records: &[SyncRecord]) -> String {
    let mut output = String::new();
    let mut total_miles = 0.0_f64;
    let mut total_cents = 0_i64;

    for record in records {
        if let SyncRecord::EmployeeProfile(profile) = record {
            let _ = writeln!(output, "# Expense report: {}", profile.name);
            let _ = writeln!(output, "Contact: {}", profile.email);
            let _ = writeln!(output);
        }
    }

    let descriptions = records
        .iter()
        .filter_map(|r| match r {
            SyncRecord::DailyDescription(d) if !d.is_deleted => Some(d),
            _ => None,
        })
        .collect::<Vec<_>>();
    if !descriptions.is_empty() {
        let _ = writeln!(output, "## Daily descriptions");
        for description in descriptions {
            let _ = writeln!(output, "### {}", description.date);
            let _ = writeln!(output, "{}", description.body);
            let _ = writeln!(output);
        }
    }

    let entries = records
        .iter()
        .filter_map(|r| match r {
            SyncRecord::MileageEntry(e) if !e.is_deleted => Some(e),
            _ => None,
        })
        .collect::<Vec<_>>();
    if !entries.is_empty() {
        let _ = writeln!(output, "## Mileage");
        let _ = writeln!(output, "| Date | Miles | From | To | Purpose |");
        let _ = writeln!(output, "|------|-------|------|----|---------|");
        for entry in entries {
            total_miles += entry.miles;
            let _ = writeln!(
                output,
                "| {} | {:.1} | {} | {} | {} |",
                entry.date, entry.miles, entry.from_location, entry.to_location, entry.purpose
            );
        }
        let _ = writeln!(output);
    }

    let receipts = records
        .iter()
        .filter_map(|r| match r {
            SyncRecord::Receipt(receipt) if !receipt.is_deleted => Some(receipt),
            _ => None,
        })
        .collect::<Vec<_>>();
    if !receipts.is_empty() {
        let _ = writeln!(output, "## Receipts");
        let _ = writeln!(output, "| Date | Amount | Vendor | Category | Note |");
        let _ = writeln!(output, "|------|--------|--------|----------|------|");
        for receipt in receipts {
            total_cents += receipt.amount_cents;
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                receipt.date,
                format_amount(receipt.amount_cents),
                receipt.vendor,
                receipt.category,
                receipt.note
            );
        }
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "## Totals");
    let _ = writeln!(output, "- Miles driven: {total_miles:.1}");
    let _ = writeln!(output, "- Expenses: {}", format_amount(total_cents));

    output
}

/// Render records based on the selected export format.
pub fn render_records_export(
    records: &[SyncRecord],
    format: ExportFormat,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(records),
        ExportFormat::Markdown => Ok(render_markdown_export(records)),
    }
}

/// Format a cent amount as a dollar string, e.g. `$12.99`.
#[must_use]
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{sign}${}.{:02}", cents / 100, cents % 100)
}

/// Build a deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("odo-export-{timestamp_ms}.{}", format.extension())
}

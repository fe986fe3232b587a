//! Odo CLI - mileage and expense tracking from the terminal
//!
//! Records are stored locally first; syncing with the backend is explicit
//! (`odo sync`) or periodic (`odo sync watch`).

mod cli;
mod commands;
mod config_file;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands, ConfigCommands, EmployeeCommands, SyncCommands};
use crate::commands::common::resolve_db_path;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("odo=info".parse().unwrap()),
        )
        .init();

    let parsed = Cli::parse();
    let db_path = resolve_db_path(parsed.db_path)?;

    match parsed.command {
        Commands::Log { date, text } => commands::entries::run_log(&date, &text, &db_path)?,
        Commands::Mileage {
            date,
            miles,
            from,
            to,
            purpose,
        } => commands::entries::run_mileage_add(&date, miles, &from, &to, &purpose, &db_path)?,
        Commands::Receipt {
            date,
            amount,
            vendor,
            category,
            note,
        } => commands::entries::run_receipt_add(&date, &amount, &vendor, &category, &note, &db_path)?,
        Commands::List {
            include_deleted,
            json,
        } => commands::list::run_list(include_deleted, json, &db_path)?,
        Commands::Delete { record_type, id } => {
            commands::entries::run_delete(&record_type, &id, &db_path)?;
        }
        Commands::Export { format, output } => {
            commands::export::run_export(format, output.as_deref(), &db_path)?;
        }
        Commands::Sync { command } => match command {
            None => commands::sync::run_sync(&db_path).await?,
            Some(SyncCommands::Push) => commands::sync::run_sync_push(&db_path).await?,
            Some(SyncCommands::Pull) => commands::sync::run_sync_pull(&db_path).await?,
            Some(SyncCommands::Conflicts { limit, json }) => {
                commands::sync::run_sync_conflicts(limit, json, &db_path)?;
            }
            Some(SyncCommands::Watch { interval }) => {
                commands::sync::run_sync_watch(interval, &db_path).await?;
            }
            Some(SyncCommands::Auto { state }) => {
                commands::sync::run_sync_auto(&state, &db_path)?;
            }
        },
        Commands::Status { json } => commands::sync::run_status(json, &db_path)?,
        Commands::Employee { command } => match command {
            EmployeeCommands::Init { name, email } => {
                commands::config::run_employee_init(&name, &email, &db_path)?;
            }
            EmployeeCommands::Show => commands::config::run_employee_show(&db_path)?,
        },
        Commands::Config { command } => match command {
            ConfigCommands::Init {
                remote_url,
                auth_token,
            } => commands::config::run_config_init(remote_url, auth_token)?,
            ConfigCommands::Show => commands::config::run_config_show()?,
        },
    }

    Ok(())
}

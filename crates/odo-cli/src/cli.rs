use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "odo")]
#[command(about = "Track mileage and expenses from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the daily description for a date
    Log {
        /// Date (YYYY-MM-DD) or 'today'
        #[arg(long, default_value = "today")]
        date: String,
        /// Description text
        text: Vec<String>,
    },
    /// Record a mileage entry
    Mileage {
        /// Date (YYYY-MM-DD) or 'today'
        #[arg(long, default_value = "today")]
        date: String,
        /// Miles driven
        miles: f64,
        /// Trip origin
        #[arg(long, default_value = "")]
        from: String,
        /// Trip destination
        #[arg(long, default_value = "")]
        to: String,
        /// Business purpose
        #[arg(long, default_value = "")]
        purpose: String,
    },
    /// Record an expense receipt
    Receipt {
        /// Date (YYYY-MM-DD) or 'today'
        #[arg(long, default_value = "today")]
        date: String,
        /// Amount in dollars, e.g. 12.50
        amount: String,
        /// Vendor name
        #[arg(long, default_value = "")]
        vendor: String,
        /// Expense category
        #[arg(long, default_value = "")]
        category: String,
        /// Free-form note
        #[arg(long, default_value = "")]
        note: String,
    },
    /// List local records
    List {
        /// Include soft-deleted records
        #[arg(long)]
        include_deleted: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a record
    Delete {
        /// Record kind: daily_description, mileage_entry or receipt
        record_type: String,
        /// Record ID
        id: String,
    },
    /// Export records
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Sync with the remote backend
    Sync {
        #[command(subcommand)]
        command: Option<SyncCommands>,
    },
    /// Sync and connection status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the employee profile
    Employee {
        #[command(subcommand)]
        command: EmployeeCommands,
    },
    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Push pending local edits to the backend
    Push,
    /// Pull remote changes into the local store
    Pull,
    /// List recently resolved sync conflicts
    Conflicts {
        /// Number of conflicts to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run auto-sync in the foreground, printing status changes
    Watch {
        /// Sync interval in seconds
        #[arg(short, long, default_value = "30")]
        interval: u64,
    },
    /// Toggle the persisted auto-sync setting
    Auto {
        /// on or off
        #[arg(value_parser = ["on", "off"])]
        state: String,
    },
}

#[derive(Subcommand)]
pub enum EmployeeCommands {
    /// Create the employee profile used for new records
    Init {
        /// Display name
        #[arg(long, value_name = "NAME")]
        name: String,
        /// Contact email
        #[arg(long, value_name = "EMAIL")]
        email: String,
    },
    /// Show the configured employee profile
    Show,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update CLI config
    Init {
        /// Remote sync endpoint base URL
        #[arg(long, value_name = "URL")]
        remote_url: Option<String>,
        /// Bearer token for the remote endpoint
        #[arg(long, value_name = "TOKEN")]
        auth_token: Option<String>,
    },
    /// Show current CLI config (token redacted)
    Show,
}

pub mod categorize;
pub mod init;
pub mod payees;
pub mod summary;

use clap::{Parser, Subcommand};

use crate::models::AccountScope;

#[derive(Parser)]
#[command(name = "penny", about = "Interactive bookkeeping assistant for bank statements.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Penny: choose a data directory for the ledger tables.
    Init {
        /// Path for Penny data (default: ~/Documents/penny)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Ingest statement CSVs and interactively categorize what's new.
    Categorize {
        /// One or more statement CSV files
        #[arg(required = true)]
        files: Vec<String>,
        /// Account scope the statements belong to (omit for the shared table)
        #[arg(long, value_enum)]
        scope: Option<AccountScope>,
    },
    /// Print category totals and regenerate the summary table.
    Summary {
        /// Account scope to report on
        #[arg(long, value_enum)]
        scope: Option<AccountScope>,
    },
    /// List canonical vendors with transaction counts and totals.
    Payees {
        /// Account scope to report on
        #[arg(long, value_enum)]
        scope: Option<AccountScope>,
    },
}

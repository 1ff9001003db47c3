mod cli;
mod clusterer;
mod error;
mod fmt;
mod ingest;
mod ledger;
mod llm;
mod models;
mod normalizer;
mod resolver;
mod session;
mod settings;
mod store;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Categorize { files, scope } => cli::categorize::run(&files, scope),
        Commands::Summary { scope } => cli::summary::run(scope),
        Commands::Payees { scope } => cli::payees::run(scope),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

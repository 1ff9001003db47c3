use std::path::PathBuf;

use colored::Colorize;

use crate::error::Result;
use crate::ingest::read_statement;
use crate::llm::OpenAiClient;
use crate::models::AccountScope;
use crate::session::{self, ConsolePrompt};
use crate::settings::load_settings;
use crate::store::{file_checksum, Store};

pub fn run(files: &[String], scope: Option<AccountScope>) -> Result<()> {
    let settings = load_settings();
    let store = Store::open_default();

    let mut rows = Vec::new();
    let mut batches: Vec<(String, String, usize)> = Vec::new();
    for file in files {
        let path = PathBuf::from(file);
        let checksum = file_checksum(&path)?;
        if store.already_imported(&checksum) {
            println!("{} already imported, skipping.", path.display());
            continue;
        }
        let parsed = read_statement(&path)?;
        println!("{} rows loaded from {}", parsed.len(), path.display());
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        batches.push((filename, checksum, parsed.len()));
        rows.extend(parsed);
    }

    if batches.is_empty() {
        println!("No new statement files.");
        return Ok(());
    }

    let llm = OpenAiClient::from_settings(&settings.llm)?;
    let mut prompt = ConsolePrompt;
    let outcome = session::run(&store, scope, settings.amount_ratio, rows, &llm, &mut prompt)?;

    // Only a completed session marks its files imported; an aborted run
    // leaves them eligible for re-ingestion, which dedup keys keep safe.
    for (filename, checksum, count) in &batches {
        store.record_import(filename, checksum, *count)?;
    }

    println!(
        "{}",
        format!(
            "Recorded {} transaction(s) across {} cluster(s).",
            outcome.new_transactions, outcome.clusters
        )
        .green()
    );
    Ok(())
}

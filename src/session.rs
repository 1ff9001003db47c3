use std::collections::{BTreeMap, BTreeSet};

use colored::Colorize;

use crate::clusterer::split_amount_clusters;
use crate::error::{PennyError, Result};
use crate::fmt::money;
use crate::ledger;
use crate::llm::LlmClient;
use crate::models::{AccountScope, ParsedRow, Transaction};
use crate::normalizer::PayeeNormalizer;
use crate::resolver;
use crate::store::Store;

/// Narrow prompt surface so the session runs against scripted input in
/// tests. Empty replies are meaningful (accept / personal shortcut), so
/// implementations must allow them.
pub trait Prompt {
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

pub struct ConsolePrompt;

impl Prompt for ConsolePrompt {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| PennyError::Other(e.to_string()))
    }
}

pub struct SessionSummary {
    pub new_transactions: usize,
    pub clusters: usize,
}

/// One interactive categorization session over freshly ingested rows.
///
/// History and new rows get fresh normalized keys, the vendor resolver
/// collapses near-duplicates across both, and each unprocessed vendor
/// group is walked cluster by cluster: describe, categorize, confirm,
/// propagate, save. The table is persisted after every cluster so an
/// interrupted run resumes safely; dedup keys keep re-runs from
/// re-prompting for anything already recorded.
pub fn run(
    store: &Store,
    scope: Option<AccountScope>,
    amount_ratio: f64,
    new_rows: Vec<ParsedRow>,
    llm: &dyn LlmClient,
    prompt: &mut dyn Prompt,
) -> Result<SessionSummary> {
    let normalizer = PayeeNormalizer::new();

    let mut existing = store.load_table(scope);
    for txn in &mut existing {
        txn.normalized_payee = normalizer.normalize(&txn.payee);
    }
    let mut incoming: Vec<Transaction> =
        new_rows.into_iter().map(ParsedRow::into_transaction).collect();
    for txn in &mut incoming {
        txn.normalized_payee = normalizer.normalize(&txn.payee);
    }

    let keys: BTreeSet<String> = existing
        .iter()
        .chain(incoming.iter())
        .map(|t| t.normalized_payee.clone())
        .filter(|k| !k.is_empty())
        .collect();
    let mapping = resolver::resolve_batch(llm, &keys);
    resolver::apply_mapping(&mut existing, &mapping);
    resolver::apply_mapping(&mut incoming, &mapping);

    let unprocessed = ledger::dedup(&existing, incoming);
    println!("{} new transactions need categorization.", unprocessed.len());

    let mut groups: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
    for txn in unprocessed {
        groups.entry(txn.normalized_payee.clone()).or_default().push(txn);
    }

    let mut summary = SessionSummary {
        new_transactions: 0,
        clusters: 0,
    };

    for (vendor, group) in groups {
        for cluster in split_amount_clusters(&group, amount_ratio) {
            println!("\nProcessing '{}' ({} transactions)", vendor, cluster.len());
            print_payment_summary(&cluster);

            let (note, category) = decide(&vendor, &cluster, scope, llm, prompt)?;

            let mut rows = cluster;
            for row in &mut rows {
                row.note = note.clone();
                row.category = category.clone();
            }
            let count = rows.len();
            let amount_range = signed_range(&rows);
            ledger::append_categorized(&mut existing, rows);
            ledger::propagate(&mut existing, &vendor, &note, &category, Some(amount_range));
            store.save_table(scope, &existing)?;
            println!(
                "{}",
                format!("\u{2705} Saved {count} transaction(s) for '{vendor}' as '{category}'")
                    .green()
            );

            summary.new_transactions += count;
            summary.clusters += 1;
        }
    }

    store.save_summary(scope, &ledger::summarize(&existing))?;
    Ok(summary)
}

/// Ask for a note and produce (note, category) for one cluster.
///
/// Shortcuts: in the personal scope an empty note marks the cluster
/// Personal without calling the collaborator; in any scope a note starting
/// with `"p "` does the same, keeping the remainder as the note. Otherwise
/// the collaborator suggests a category and the operator may override it.
fn decide(
    vendor: &str,
    cluster: &[Transaction],
    scope: Option<AccountScope>,
    llm: &dyn LlmClient,
    prompt: &mut dyn Prompt,
) -> Result<(String, String)> {
    let personal = scope == Some(AccountScope::Personal);
    let question = if personal {
        "Describe the expense or press enter if personal"
    } else {
        "Describe the expense"
    };
    let note = prompt.ask(question)?.trim().to_string();

    if personal && note.is_empty() {
        return Ok((note, "Personal".to_string()));
    }
    if let Some(rest) = note.strip_prefix("p ") {
        return Ok((rest.trim().to_string(), "Personal".to_string()));
    }

    let mean = cluster.iter().map(|t| t.amount).sum::<f64>() / cluster.len().max(1) as f64;
    let suggested = llm.categorize(vendor, mean, &note)?;
    let category = confirm_category(prompt, &suggested)?;
    Ok((note, category))
}

/// Offer the operator a replacement for the suggested category; empty input
/// accepts the suggestion.
pub fn confirm_category(prompt: &mut dyn Prompt, suggested: &str) -> Result<String> {
    let answer = prompt.ask(&format!(
        "Suggested category '{suggested}' (enter to accept, or type a replacement)"
    ))?;
    let answer = answer.trim();
    if answer.is_empty() {
        Ok(suggested.to_string())
    } else {
        Ok(answer.to_string())
    }
}

fn print_payment_summary(cluster: &[Transaction]) {
    let mut amounts: Vec<f64> = cluster.iter().map(|t| t.amount).collect();
    amounts.sort_by(|a, b| a.total_cmp(b));

    println!("Payment summary:");
    let mut i = 0;
    while i < amounts.len() {
        let amount = amounts[i];
        let count = amounts[i..].iter().take_while(|a| **a == amount).count();
        println!("  {} payment(s) of {}", count, money(amount));
        i += count;
    }
}

fn signed_range(rows: &[Transaction]) -> (f64, f64) {
    let mut low = f64::INFINITY;
    let mut high = f64::NEG_INFINITY;
    for row in rows {
        low = low.min(row.amount);
        high = high.max(row.amount);
    }
    (low, high)
}

use std::collections::{BTreeSet, HashMap};

use colored::Colorize;

use crate::llm::LlmClient;
use crate::models::Transaction;

/// Collapse near-duplicate normalized payee keys to canonical names via the
/// collaborator. Never fails: a transport error, an unparseable reply, or a
/// missing key all degrade to identity for the keys concerned, so a
/// malformed response can never block a run. Keys that need no change map
/// to themselves.
pub fn resolve_batch(llm: &dyn LlmClient, keys: &BTreeSet<String>) -> HashMap<String, String> {
    let mut mapping = HashMap::new();
    if keys.is_empty() {
        return mapping;
    }

    let names: Vec<String> = keys.iter().cloned().collect();
    match llm.normalize_payees(&names) {
        Ok(reply) => {
            if let Some(parsed) = parse_mapping(&reply) {
                mapping = parsed;
            } else {
                eprintln!(
                    "{}",
                    "Could not parse vendor-name mapping; keeping names as-is.".yellow()
                );
            }
        }
        Err(e) => {
            eprintln!(
                "{}",
                format!("Vendor-name resolution failed ({e}); keeping names as-is.").yellow()
            );
        }
    }

    mapping.retain(|_, canonical| !canonical.trim().is_empty());
    for key in keys {
        mapping
            .entry(key.clone())
            .or_insert_with(|| key.clone());
    }
    mapping
}

/// Extract a string→string JSON object from the reply, tolerating prose or
/// code fences around it.
fn parse_mapping(reply: &str) -> Option<HashMap<String, String>> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&reply[start..=end]).ok()
}

/// Substitute canonical names over a table's normalized-payee column.
pub fn apply_mapping(rows: &mut [Transaction], mapping: &HashMap<String, String>) {
    for txn in rows.iter_mut() {
        if let Some(canonical) = mapping.get(&txn.normalized_payee) {
            txn.normalized_payee = canonical.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PennyError, Result};

    struct ReplyLlm(String);

    impl LlmClient for ReplyLlm {
        fn categorize(&self, _: &str, _: f64, _: &str) -> Result<String> {
            Ok("Uncategorized".to_string())
        }
        fn normalize_payees(&self, _: &[String]) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingLlm;

    impl LlmClient for FailingLlm {
        fn categorize(&self, _: &str, _: f64, _: &str) -> Result<String> {
            Err(PennyError::Categorizer("down".to_string()))
        }
        fn normalize_payees(&self, _: &[String]) -> Result<String> {
            Err(PennyError::Categorizer("down".to_string()))
        }
    }

    fn keys(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_mapping_is_applied_and_backfilled() {
        let llm = ReplyLlm(r#"{"AMAZON DIGITAL SVCS": "AMZN DIGITAL"}"#.to_string());
        let mapping = resolve_batch(&llm, &keys(&["AMAZON DIGITAL SVCS", "HEB"]));
        assert_eq!(mapping["AMAZON DIGITAL SVCS"], "AMZN DIGITAL");
        assert_eq!(mapping["HEB"], "HEB");
    }

    #[test]
    fn test_unparseable_reply_degrades_to_identity() {
        let llm = ReplyLlm("Sure! Here are the canonical names you asked for.".to_string());
        let mapping = resolve_batch(&llm, &keys(&["A", "B"]));
        assert_eq!(mapping["A"], "A");
        assert_eq!(mapping["B"], "B");
    }

    #[test]
    fn test_non_string_values_degrade_to_identity() {
        let llm = ReplyLlm(r#"{"A": 1, "B": ["x"]}"#.to_string());
        let mapping = resolve_batch(&llm, &keys(&["A", "B"]));
        assert_eq!(mapping["A"], "A");
        assert_eq!(mapping["B"], "B");
    }

    #[test]
    fn test_code_fenced_reply_is_tolerated() {
        let llm = ReplyLlm("```json\n{\"A\": \"ALPHA\"}\n```".to_string());
        let mapping = resolve_batch(&llm, &keys(&["A"]));
        assert_eq!(mapping["A"], "ALPHA");
    }

    #[test]
    fn test_transport_error_degrades_to_identity() {
        let mapping = resolve_batch(&FailingLlm, &keys(&["A"]));
        assert_eq!(mapping["A"], "A");
    }

    #[test]
    fn test_empty_canonical_names_are_discarded() {
        let llm = ReplyLlm(r#"{"A": "  "}"#.to_string());
        let mapping = resolve_batch(&llm, &keys(&["A"]));
        assert_eq!(mapping["A"], "A");
    }

    #[test]
    fn test_empty_key_set_skips_the_call() {
        let mapping = resolve_batch(&FailingLlm, &BTreeSet::new());
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_apply_mapping_substitutes_column() {
        let mut rows = vec![
            {
                let mut t = Transaction::new("raw a".to_string(), None, 1.0);
                t.normalized_payee = "AMAZON DIGITAL SVCS".to_string();
                t
            },
            {
                let mut t = Transaction::new("raw b".to_string(), None, 2.0);
                t.normalized_payee = "HEB".to_string();
                t
            },
        ];
        let mut mapping = HashMap::new();
        mapping.insert("AMAZON DIGITAL SVCS".to_string(), "AMZN DIGITAL".to_string());
        apply_mapping(&mut rows, &mapping);
        assert_eq!(rows[0].normalized_payee, "AMZN DIGITAL");
        assert_eq!(rows[1].normalized_payee, "HEB");
    }
}

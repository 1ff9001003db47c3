use std::collections::{BTreeMap, HashSet};

use crate::models::{CategoryTotal, Transaction};

/// Filter `incoming` down to rows whose identity key is not already in
/// `existing`. Re-ingesting a statement therefore produces no duplicates.
pub fn dedup(existing: &[Transaction], incoming: Vec<Transaction>) -> Vec<Transaction> {
    let processed: HashSet<String> = existing.iter().map(|t| t.key()).collect();
    incoming
        .into_iter()
        .filter(|t| !processed.contains(&t.key()))
        .collect()
}

/// Append freshly categorized rows. Callers guarantee the rows are
/// post-dedup; no key-collision check happens here.
pub fn append_categorized(existing: &mut Vec<Transaction>, rows: Vec<Transaction>) {
    existing.extend(rows);
}

/// Overwrite note and category on every row of the vendor, optionally
/// limited to signed amounts within `[low, high]` inclusive. This is how a
/// single operator decision retroactively relabels historical rows instead
/// of re-prompting for them. Returns the number of rows updated.
pub fn propagate(
    existing: &mut [Transaction],
    vendor_key: &str,
    note: &str,
    category: &str,
    amount_range: Option<(f64, f64)>,
) -> usize {
    let mut updated = 0;
    for txn in existing.iter_mut() {
        if txn.normalized_payee != vendor_key {
            continue;
        }
        if let Some((low, high)) = amount_range {
            if txn.amount < low || txn.amount > high {
                continue;
            }
        }
        txn.note = note.to_string();
        txn.category = category.to_string();
        updated += 1;
    }
    updated
}

/// Sum signed amounts per category, sorted by category name. The
/// empty-string category is the unlabeled bucket. Empty input yields an
/// empty, correctly shaped result.
pub fn summarize(existing: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for txn in existing {
        *totals.entry(txn.category.clone()).or_default() += txn.amount;
    }
    totals
        .into_iter()
        .map(|(category, total_amount)| CategoryTotal {
            category,
            total_amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txn(payee: &str, date: &str, amount: f64) -> Transaction {
        let mut t = Transaction::new(
            payee.to_string(),
            NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            amount,
        );
        t.normalized_payee = payee.to_string();
        t
    }

    fn labeled(payee: &str, date: &str, amount: f64, category: &str) -> Transaction {
        let mut t = txn(payee, date, amount);
        t.category = category.to_string();
        t
    }

    #[test]
    fn test_dedup_drops_already_processed_rows() {
        let existing = vec![txn("HEB", "2024-01-05", -50.0)];
        let incoming = vec![
            txn("HEB", "2024-01-05", -50.0),
            txn("HEB", "2024-01-06", -50.0),
        ];
        let fresh = dedup(&existing, incoming);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].date.unwrap().to_string(), "2024-01-06");
    }

    #[test]
    fn test_dedup_reingest_is_a_noop() {
        let existing = vec![
            txn("HEB", "2024-01-05", -50.0),
            txn("ADOBE", "2024-01-06", -20.0),
        ];
        let incoming = existing.clone();
        assert!(dedup(&existing, incoming).is_empty());
    }

    #[test]
    fn test_append_preserves_prior_rows() {
        let mut existing = vec![txn("A", "2024-01-01", 1.0)];
        append_categorized(&mut existing, vec![txn("B", "2024-01-02", 2.0)]);
        assert_eq!(existing.len(), 2);
        assert_eq!(existing[0].payee, "A");
        assert_eq!(existing[1].payee, "B");
    }

    #[test]
    fn test_propagate_updates_only_matching_vendor() {
        let mut table = vec![
            txn("A", "2024-01-01", 1.0),
            txn("A", "2024-01-02", 2.0),
            txn("B", "2024-01-03", 3.0),
        ];
        let updated = propagate(&mut table, "A", "Coffee", "Meals", None);
        assert_eq!(updated, 2);
        for t in table.iter().filter(|t| t.normalized_payee == "A") {
            assert_eq!(t.note, "Coffee");
            assert_eq!(t.category, "Meals");
        }
        let b = table.iter().find(|t| t.normalized_payee == "B").unwrap();
        assert!(b.note.is_empty());
        assert!(b.category.is_empty());
    }

    #[test]
    fn test_propagate_respects_inclusive_amount_range() {
        let mut table = vec![
            txn("A", "2024-01-01", -10.0),
            txn("A", "2024-01-02", -12.0),
            txn("A", "2024-01-03", -400.0),
        ];
        let updated = propagate(&mut table, "A", "Streaming", "Subscriptions", Some((-12.0, -10.0)));
        assert_eq!(updated, 2);
        assert_eq!(table[0].category, "Subscriptions");
        assert_eq!(table[1].category, "Subscriptions");
        assert!(table[2].category.is_empty());
    }

    #[test]
    fn test_propagate_range_boundaries_included() {
        let mut table = vec![txn("A", "2024-01-01", 5.0), txn("A", "2024-01-02", 15.0)];
        let updated = propagate(&mut table, "A", "n", "c", Some((5.0, 15.0)));
        assert_eq!(updated, 2);
    }

    #[test]
    fn test_summarize_groups_and_sums() {
        let table = vec![
            labeled("A", "2024-01-01", 10.0, "Meals"),
            labeled("B", "2024-01-02", 20.0, "Meals"),
            labeled("C", "2024-01-03", 30.0, "Office"),
        ];
        let summary = summarize(&table);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].category, "Meals");
        assert_eq!(summary[0].total_amount, 30.0);
        assert_eq!(summary[1].category, "Office");
        assert_eq!(summary[1].total_amount, 30.0);
    }

    #[test]
    fn test_summarize_keeps_unlabeled_bucket() {
        let table = vec![
            labeled("A", "2024-01-01", 10.0, "Meals"),
            txn("B", "2024-01-02", 5.0),
        ];
        let summary = summarize(&table);
        assert_eq!(summary[0].category, "");
        assert_eq!(summary[0].total_amount, 5.0);
    }

    #[test]
    fn test_summarize_empty_input() {
        assert!(summarize(&[]).is_empty());
    }
}

use std::collections::BTreeMap;

use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::models::AccountScope;
use crate::normalizer::PayeeNormalizer;
use crate::store::Store;

pub fn run(scope: Option<AccountScope>) -> Result<()> {
    let store = Store::open_default();
    let rows = store.load_table(scope);

    if rows.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    let normalizer = PayeeNormalizer::new();
    let mut stats: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for txn in &rows {
        let vendor = normalizer.normalize(&txn.payee);
        let entry = stats.entry(vendor).or_default();
        entry.0 += 1;
        entry.1 += txn.amount;
    }

    let mut out = Table::new();
    out.set_header(vec!["Vendor", "Transactions", "Total"]);
    for (vendor, (count, total)) in &stats {
        out.add_row(vec![
            Cell::new(vendor),
            Cell::new(count),
            Cell::new(money(*total)),
        ]);
    }
    println!("Vendors\n{out}");
    Ok(())
}

use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::ledger::summarize;
use crate::models::AccountScope;
use crate::store::Store;

pub fn run(scope: Option<AccountScope>) -> Result<()> {
    let store = Store::open_default();
    let table = store.load_table(scope);
    let totals = summarize(&table);

    if totals.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    let mut out = Table::new();
    out.set_header(vec!["Category", "Total"]);
    for total in &totals {
        let name = if total.category.is_empty() {
            "(uncategorized)"
        } else {
            total.category.as_str()
        };
        out.add_row(vec![Cell::new(name), Cell::new(money(total.total_amount))]);
    }
    println!("Category totals\n{out}");

    store.save_summary(scope, &totals)?;
    Ok(())
}

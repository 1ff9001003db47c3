use chrono::NaiveDate;

/// One ledger line. `normalized_payee` is derived and recomputed on every
/// load; `note` and `category` are the only fields mutated after insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub payee: String,
    pub normalized_payee: String,
    pub date: Option<NaiveDate>,
    pub amount: f64,
    pub note: String,
    pub category: String,
}

impl Transaction {
    pub fn new(payee: String, date: Option<NaiveDate>, amount: f64) -> Self {
        Self {
            payee,
            normalized_payee: String::new(),
            date,
            amount,
            note: String::new(),
            category: String::new(),
        }
    }

    /// Identity key for deduplication: the exact (payee, date, amount)
    /// triple. An unparseable date renders as an empty field.
    pub fn key(&self) -> String {
        let date = self
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        format!("{}|{}|{}", self.payee, date, self.amount)
    }
}

/// Intermediate representation from a statement parser before it enters the
/// ledger. Rows that reach this type always have a parsed date.
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub date: NaiveDate,
    pub payee: String,
    pub amount: f64,
}

impl ParsedRow {
    pub fn into_transaction(self) -> Transaction {
        Transaction::new(self.payee, Some(self.date), self.amount)
    }
}

/// One row of the derived summary table. The empty-string category is the
/// unlabeled bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total_amount: f64,
}

/// Which persisted table a run reads and writes. `None` at call sites
/// selects the default shared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AccountScope {
    Business,
    Personal,
}

impl AccountScope {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Personal => "personal",
        }
    }
}

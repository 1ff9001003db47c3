use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::{AccountScope, CategoryTotal, Transaction};

/// On-disk tables for one data directory: a categorized-transaction CSV and
/// a derived summary CSV per account scope, plus a JSON log of imported
/// statement files.
pub struct Store {
    data_dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableRecord {
    payee: String,
    normalized_payee: String,
    date: String,
    amount: f64,
    note: String,
    category: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SummaryRecord {
    category: String,
    total_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRecord {
    pub filename: String,
    pub checksum: String,
    pub rows: usize,
    pub imported_at: String,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn open_default() -> Self {
        Self::new(crate::settings::get_data_dir())
    }

    fn table_path(&self, scope: Option<AccountScope>) -> PathBuf {
        let name = match scope {
            Some(s) => format!("{}_table.csv", s.key()),
            None => "output_table.csv".to_string(),
        };
        self.data_dir.join(name)
    }

    fn summary_path(&self, scope: Option<AccountScope>) -> PathBuf {
        let name = match scope {
            Some(s) => format!("{}_summary.csv", s.key()),
            None => "summary_table.csv".to_string(),
        };
        self.data_dir.join(name)
    }

    fn imports_path(&self) -> PathBuf {
        self.data_dir.join("imports.json")
    }

    // -----------------------------------------------------------------------
    // Transaction table
    // -----------------------------------------------------------------------

    /// Load the scope's table. A missing or unreadable file is an empty
    /// table; malformed records are skipped; unparseable dates load as
    /// `None`. The stored `normalized_payee` column is carried along but
    /// callers recompute it; it is derived, not trusted.
    pub fn load_table(&self, scope: Option<AccountScope>) -> Vec<Transaction> {
        let path = self.table_path(scope);
        let Ok(mut rdr) = csv::Reader::from_path(&path) else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        for result in rdr.deserialize::<TableRecord>() {
            let Ok(rec) = result else { continue };
            rows.push(Transaction {
                payee: rec.payee,
                normalized_payee: rec.normalized_payee,
                date: NaiveDate::parse_from_str(&rec.date, "%Y-%m-%d").ok(),
                amount: rec.amount,
                note: rec.note,
                category: rec.category,
            });
        }
        rows
    }

    /// Full rewrite of the scope's table. Called after every cluster
    /// decision so an interrupted run keeps everything saved so far.
    pub fn save_table(&self, scope: Option<AccountScope>, rows: &[Transaction]) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let mut wtr = csv::Writer::from_path(self.table_path(scope))?;
        for txn in rows {
            wtr.serialize(TableRecord {
                payee: txn.payee.clone(),
                normalized_payee: txn.normalized_payee.clone(),
                date: txn
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                amount: txn.amount,
                note: txn.note.clone(),
                category: txn.category.clone(),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Regenerate (not append to) the scope's category-total summary.
    pub fn save_summary(&self, scope: Option<AccountScope>, totals: &[CategoryTotal]) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let mut wtr = csv::Writer::from_path(self.summary_path(scope))?;
        for total in totals {
            wtr.serialize(SummaryRecord {
                category: total.category.clone(),
                total_amount: total.total_amount,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Import log
    // -----------------------------------------------------------------------

    pub fn load_imports(&self) -> Vec<ImportRecord> {
        let Ok(content) = std::fs::read_to_string(self.imports_path()) else {
            return Vec::new();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    pub fn already_imported(&self, checksum: &str) -> bool {
        self.load_imports().iter().any(|r| r.checksum == checksum)
    }

    pub fn record_import(&self, filename: &str, checksum: &str, rows: usize) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let mut log = self.load_imports();
        log.push(ImportRecord {
            filename: filename.to_string(),
            checksum: checksum.to_string(),
            rows,
            imported_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        });
        let json = serde_json::to_string_pretty(&log)
            .map_err(|e| crate::error::PennyError::Other(e.to_string()))?;
        std::fs::write(self.imports_path(), format!("{json}\n"))?;
        Ok(())
    }
}

pub fn file_checksum(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

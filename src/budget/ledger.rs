//! Persisted cost ledger: one (date, cumulative spend) pair.

use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::BudgetError;

const DATE_KEY: &str = "cost_ledger_date";
const SPEND_KEY: &str = "cost_ledger_spend";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub spent: f64,
}

impl LedgerEntry {
    /// Fresh ledger for `date` with nothing spent.
    pub fn new(date: NaiveDate) -> Self {
        Self { date, spent: 0.0 }
    }
}

/// Storage for the ledger. Calls are made while the governor holds its lock,
/// so implementations never see concurrent writers from one process.
pub trait LedgerStore: Send + Sync {
    fn load(&self) -> Result<Option<LedgerEntry>, BudgetError>;
    fn save(&self, entry: &LedgerEntry) -> Result<(), BudgetError>;
}

/// Non-persistent store for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    entry: Mutex<Option<LedgerEntry>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(entry: LedgerEntry) -> Self {
        Self {
            entry: Mutex::new(Some(entry)),
        }
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<Option<LedgerEntry>, BudgetError> {
        let entry = self
            .entry
            .lock()
            .map_err(|_| BudgetError::Storage("ledger lock poisoned".to_string()))?;
        Ok(entry.clone())
    }

    fn save(&self, entry: &LedgerEntry) -> Result<(), BudgetError> {
        let mut slot = self
            .entry
            .lock()
            .map_err(|_| BudgetError::Storage("ledger lock poisoned".to_string()))?;
        *slot = Some(entry.clone());
        Ok(())
    }
}

/// SQLite-backed key/value state holding the two ledger scalars.
pub struct SqliteLedgerStore {
    conn: Mutex<Connection>,
}

impl SqliteLedgerStore {
    pub fn open(path: &Path) -> Result<Self, BudgetError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    BudgetError::Storage(format!(
                        "cannot create ledger directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, BudgetError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, BudgetError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn get(conn: &Connection, key: &str) -> Result<Option<String>, BudgetError> {
        Ok(conn
            .query_row(
                "SELECT value FROM kv_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn load(&self) -> Result<Option<LedgerEntry>, BudgetError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| BudgetError::Storage("ledger connection lock poisoned".to_string()))?;

        let (Some(date), Some(spent)) = (Self::get(&conn, DATE_KEY)?, Self::get(&conn, SPEND_KEY)?)
        else {
            return Ok(None);
        };

        let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| BudgetError::Storage(format!("bad ledger date {:?}: {}", date, e)))?;
        let spent = spent
            .parse::<f64>()
            .map_err(|e| BudgetError::Storage(format!("bad ledger spend {:?}: {}", spent, e)))?;

        Ok(Some(LedgerEntry { date, spent }))
    }

    fn save(&self, entry: &LedgerEntry) -> Result<(), BudgetError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| BudgetError::Storage("ledger connection lock poisoned".to_string()))?;

        let tx = conn.transaction()?;
        for (key, value) in [
            (DATE_KEY, entry.date.format(DATE_FORMAT).to_string()),
            (SPEND_KEY, entry.spent.to_string()),
        ] {
            tx.execute(
                "INSERT INTO kv_state (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryLedgerStore::new();
        assert_eq!(store.load().unwrap(), None);
        store
            .save(&LedgerEntry {
                date: day(1),
                spent: 1.5,
            })
            .unwrap();
        assert_eq!(store.load().unwrap().unwrap().spent, 1.5);
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("ledger.db");

        {
            let store = SqliteLedgerStore::open(&path).unwrap();
            assert_eq!(store.load().unwrap(), None);
            store
                .save(&LedgerEntry {
                    date: day(2),
                    spent: 0.25,
                })
                .unwrap();
            store
                .save(&LedgerEntry {
                    date: day(3),
                    spent: 0.75,
                })
                .unwrap();
        }

        let reopened = SqliteLedgerStore::open(&path).unwrap();
        let entry = reopened.load().unwrap().unwrap();
        assert_eq!(entry.date, day(3));
        assert_eq!(entry.spent, 0.75);
    }

    #[test]
    fn test_sqlite_store_rejects_corrupt_date() {
        let store = SqliteLedgerStore::in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO kv_state (key, value) VALUES (?1, 'yesterday'), (?2, '1.0')",
                params![DATE_KEY, SPEND_KEY],
            )
            .unwrap();
        }
        assert!(matches!(store.load(), Err(BudgetError::Storage(_))));
    }
}

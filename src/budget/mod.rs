//! Budget module - daily spend ceiling for model calls.
//!
//! # Key Concepts
//! - Governor: gate before every call, ledger increment after every call
//! - Pricing: per-model token rates and the cost formula
//! - Ledger: the persisted (day, cumulative spend) pair

mod governor;
mod ledger;
mod pricing;

pub use governor::{BudgetStatus, Clock, CostGovernor, SystemClock, DEFAULT_DAILY_LIMIT};
pub use ledger::{LedgerEntry, LedgerStore, MemoryLedgerStore, SqliteLedgerStore};
pub use pricing::ModelPricing;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("daily model budget of {limit:.2} reached ({spent:.2} spent)")]
    DailyCostExceeded { spent: f64, limit: f64 },

    #[error("cost ledger storage failed: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for BudgetError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::sync::Mutex;

use super::{BudgetError, LedgerEntry, LedgerStore};

/// Default daily ceiling, in currency units.
pub const DEFAULT_DAILY_LIMIT: f64 = 10.0;

/// Source of "today" for the day-rollover rule.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Snapshot of the ledger for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub date: NaiveDate,
    pub spent: f64,
    pub limit: f64,
    pub remaining: f64,
}

/// Enforces the daily spend ceiling shared by every in-flight request.
///
/// # Invariants
/// - All reads and writes of the ledger happen under one async mutex, so
///   concurrent `check_budget`/`record_spend` calls cannot lose an increment
///   or reset the day twice.
/// - The store is written through on every mutation.
pub struct CostGovernor {
    daily_limit: f64,
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    ledger: Mutex<LedgerEntry>,
}

impl CostGovernor {
    /// Load the persisted ledger (or start an empty one for today).
    pub fn new(
        daily_limit: f64,
        store: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BudgetError> {
        let entry = match store.load()? {
            Some(entry) => entry,
            None => LedgerEntry::new(clock.today()),
        };
        tracing::info!(
            date = %entry.date,
            spent = entry.spent,
            limit = daily_limit,
            "Cost ledger loaded"
        );
        Ok(Self {
            daily_limit,
            store,
            clock,
            ledger: Mutex::new(entry),
        })
    }

    pub fn daily_limit(&self) -> f64 {
        self.daily_limit
    }

    /// Gate for an outbound call. Fails once today's spend reaches the ceiling.
    pub async fn check_budget(&self) -> Result<(), BudgetError> {
        let mut ledger = self.ledger.lock().await;
        self.roll_over(&mut ledger)?;

        if ledger.spent >= self.daily_limit {
            tracing::warn!(
                spent = ledger.spent,
                limit = self.daily_limit,
                "Daily model budget exhausted; refusing call"
            );
            return Err(BudgetError::DailyCostExceeded {
                spent: ledger.spent,
                limit: self.daily_limit,
            });
        }
        Ok(())
    }

    /// Add the cost of a completed call to today's ledger.
    pub async fn record_spend(&self, amount: f64) -> Result<(), BudgetError> {
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };

        let mut ledger = self.ledger.lock().await;
        self.roll_over(&mut ledger)?;
        ledger.spent += amount;
        self.store.save(&ledger)?;

        tracing::debug!(amount = amount, spent = ledger.spent, "Recorded model spend");
        Ok(())
    }

    pub async fn status(&self) -> Result<BudgetStatus, BudgetError> {
        let mut ledger = self.ledger.lock().await;
        self.roll_over(&mut ledger)?;
        Ok(BudgetStatus {
            date: ledger.date,
            spent: ledger.spent,
            limit: self.daily_limit,
            remaining: (self.daily_limit - ledger.spent).max(0.0),
        })
    }

    fn roll_over(&self, ledger: &mut LedgerEntry) -> Result<(), BudgetError> {
        let today = self.clock.today();
        if ledger.date != today {
            tracing::info!(
                previous = %ledger.date,
                today = %today,
                carried = ledger.spent,
                "New day; resetting cost ledger"
            );
            *ledger = LedgerEntry::new(today);
            self.store.save(ledger)?;
        }
        Ok(())
    }
}

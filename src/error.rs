//! Crate-level error returned by the extraction client and the pipeline.

use thiserror::Error;

use crate::budget::BudgetError;
use crate::llm::{LlmError, LlmErrorKind};

#[derive(Debug, Error)]
pub enum MenuError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("daily model budget reached ({spent:.2} of {limit:.2} spent); try again tomorrow")]
    DailyCostExceeded { spent: f64, limit: f64 },

    #[error("menu image could not be encoded: {0}")]
    ImageEncoding(String),

    #[error("cost ledger unavailable: {0}")]
    Ledger(String),

    #[error("request cancelled")]
    Cancelled,
}

impl MenuError {
    /// Failure class when the error came from the model endpoint.
    pub fn llm_kind(&self) -> Option<LlmErrorKind> {
        match self {
            Self::Llm(e) => Some(e.kind),
            _ => None,
        }
    }
}

impl From<BudgetError> for MenuError {
    fn from(e: BudgetError) -> Self {
        match e {
            BudgetError::DailyCostExceeded { spent, limit } => {
                Self::DailyCostExceeded { spent, limit }
            }
            BudgetError::Storage(message) => Self::Ledger(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_errors_map_to_distinct_variants() {
        let err: MenuError = BudgetError::DailyCostExceeded {
            spent: 10.5,
            limit: 10.0,
        }
        .into();
        assert!(matches!(err, MenuError::DailyCostExceeded { .. }));
        assert!(err.to_string().contains("try again tomorrow"));

        let err: MenuError = BudgetError::Storage("disk full".to_string()).into();
        assert!(matches!(err, MenuError::Ledger(ref m) if m == "disk full"));
    }

    #[test]
    fn test_llm_kind() {
        let err = MenuError::from(LlmError::from_status(401, ""));
        assert_eq!(err.llm_kind(), Some(LlmErrorKind::InvalidCredentials));
        assert_eq!(MenuError::Cancelled.llm_kind(), None);
    }
}

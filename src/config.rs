//! Service configuration, read from the environment.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::budget::DEFAULT_DAILY_LIMIT;
use crate::llm::RetryConfig;

pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetConfig {
    pub daily_limit: f64,
    pub ledger_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub llm: LlmConfig,
    pub budget: BudgetConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Unset or blank variables take
    /// their defaults; set but malformed ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = parse_or(get("MENU_HOST"), "MENU_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or(get("MENU_PORT"), "MENU_PORT", 3000u16)?;

        let endpoint = get("MENU_LLM_ENDPOINT").unwrap_or_else(|| DEFAULT_LLM_ENDPOINT.to_string());
        Url::parse(&endpoint).map_err(|e| ConfigError::invalid("MENU_LLM_ENDPOINT", &endpoint, e))?;

        let model = get("MENU_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());
        let timeout_secs = parse_or(get("MENU_LLM_TIMEOUT_SECS"), "MENU_LLM_TIMEOUT_SECS", 60u64)?;
        let defaults = RetryConfig::default();
        let max_retries = parse_or(
            get("MENU_LLM_MAX_RETRIES"),
            "MENU_LLM_MAX_RETRIES",
            defaults.max_retries,
        )?;

        let daily_limit = parse_or(get("MENU_DAILY_BUDGET"), "MENU_DAILY_BUDGET", DEFAULT_DAILY_LIMIT)?;
        if !daily_limit.is_finite() || daily_limit < 0.0 {
            return Err(ConfigError::invalid(
                "MENU_DAILY_BUDGET",
                &daily_limit.to_string(),
                "must be a non-negative amount",
            ));
        }
        let ledger_path = get("MENU_LEDGER_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/cost_ledger.db"));

        Ok(Self {
            host,
            port,
            llm: LlmConfig {
                endpoint,
                model,
                request_timeout: Duration::from_secs(timeout_secs),
                retry: RetryConfig::new(max_retries, defaults.base_delay),
            },
            budget: BudgetConfig {
                daily_limit,
                ledger_path,
            },
        })
    }
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .parse::<T>()
            .map_err(|e| ConfigError::invalid(var, &value, e)),
        None => Ok(default),
    }
}

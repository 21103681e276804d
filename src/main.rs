//! Menu sommelier HTTP server.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use menu_sommelier::api::{self, AppState};
use menu_sommelier::budget::{CostGovernor, SqliteLedgerStore, SystemClock};
use menu_sommelier::config::{Config, API_KEY_VAR};
use menu_sommelier::llm::{EnvCredentials, OpenAiTransport};
use menu_sommelier::pipeline::MenuPipeline;
use menu_sommelier::recommend::RecommendationSelector;
use menu_sommelier::vision::VisionExtractionClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("menu_sommelier=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(
        model = %config.llm.model,
        endpoint = %config.llm.endpoint,
        daily_limit = config.budget.daily_limit,
        "Starting menu sommelier"
    );

    let store = SqliteLedgerStore::open(&config.budget.ledger_path).with_context(|| {
        format!(
            "cannot open cost ledger at {}",
            config.budget.ledger_path.display()
        )
    })?;
    let governor = Arc::new(CostGovernor::new(
        config.budget.daily_limit,
        Arc::new(store),
        Arc::new(SystemClock),
    )?);

    let credentials = EnvCredentials::new(API_KEY_VAR);
    if std::env::var(API_KEY_VAR).map(|k| k.trim().is_empty()).unwrap_or(true) {
        tracing::warn!("{} is not set; model calls will fail until it is", API_KEY_VAR);
    }
    let transport = OpenAiTransport::new(
        &config.llm.endpoint,
        Arc::new(credentials),
        config.llm.request_timeout,
    )?;

    let client = VisionExtractionClient::new(
        Arc::new(transport),
        governor.clone(),
        config.llm.model.clone(),
    )
    .with_retry(config.llm.retry.clone());

    let pipeline = MenuPipeline::new(Arc::new(client), RecommendationSelector::default());
    let state = AppState {
        pipeline: Arc::new(pipeline),
        governor,
    };

    api::serve(&config, state).await
}

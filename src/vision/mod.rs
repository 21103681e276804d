//! Governed client for the external vision-language model.
//!
//! Every call is gated by the [`CostGovernor`], retried with bounded
//! exponential backoff on transient failures, and charged to the ledger once
//! the endpoint has answered.

mod payload;
mod prompts;

pub use payload::{ExtractionPayload, RankingPayload, RawMenuItem, RawRanking};

use std::future::Future;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::budget::{CostGovernor, ModelPricing};
use crate::error::MenuError;
use crate::llm::{
    classify_http_status, decode_payload, ChatMessage, ChatOptions, ChatRequest, ChatResponse,
    ChatTransport, LlmError, RetryConfig,
};
use crate::menu::MenuItem;
use crate::profile::UserProfile;
use crate::recommend::MAX_RECOMMENDATIONS;

pub const EXTRACTION_OPTIONS: ChatOptions = ChatOptions {
    temperature: 0.1,
    max_tokens: 2000,
};

pub const RANKING_OPTIONS: ChatOptions = ChatOptions {
    temperature: 0.2,
    max_tokens: 1000,
};

/// A model-ranked item with the model's own reasoning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub item: MenuItem,
    pub score: f64,
    pub reasoning: String,
    pub drink_pairing: Option<String>,
}

pub struct VisionExtractionClient {
    transport: Arc<dyn ChatTransport>,
    governor: Arc<CostGovernor>,
    model: String,
    pricing: ModelPricing,
    retry: RetryConfig,
    cancel_token: Option<CancellationToken>,
}

impl VisionExtractionClient {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        governor: Arc<CostGovernor>,
        model: impl Into<String>,
    ) -> Self {
        let model = model.into();
        Self {
            transport,
            governor,
            pricing: ModelPricing::for_model(&model),
            model,
            retry: RetryConfig::default(),
            cancel_token: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_pricing(mut self, pricing: ModelPricing) -> Self {
        self.pricing = pricing;
        self
    }

    /// Abort backoff sleeps and in-flight sends once `token` fires.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn governor(&self) -> &Arc<CostGovernor> {
        &self.governor
    }

    /// Read every dish off a menu photo.
    pub async fn extract_menu_items(&self, image: &[u8]) -> Result<Vec<MenuItem>, MenuError> {
        let image_url = encode_image(image)?;
        let messages = vec![
            ChatMessage::system(prompts::EXTRACTION_SYSTEM),
            ChatMessage::user_with_image(prompts::extraction_instruction(), image_url),
        ];

        let content = self.complete(messages, EXTRACTION_OPTIONS, "extraction").await?;
        let payload: ExtractionPayload = decode_payload(&content)?;
        let items = payload.into_menu_items();

        tracing::info!(items = items.len(), "Extracted menu items");
        Ok(items)
    }

    /// Ask the model to rank `items` for `profile`. The result only contains
    /// items from `items`, in the model's order, at most six of them.
    pub async fn rank_menu_items(
        &self,
        items: &[MenuItem],
        profile: &UserProfile,
    ) -> Result<Vec<RankedItem>, MenuError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let messages = vec![
            ChatMessage::system(prompts::RANKING_SYSTEM),
            ChatMessage::user(prompts::ranking_instruction(
                items,
                profile,
                MAX_RECOMMENDATIONS,
            )),
        ];

        let content = self.complete(messages, RANKING_OPTIONS, "ranking").await?;
        let payload: RankingPayload = decode_payload(&content)?;
        let ranked = payload::resolve_rankings(payload, items, MAX_RECOMMENDATIONS);

        tracing::info!(
            candidates = items.len(),
            ranked = ranked.len(),
            "Model ranked menu items"
        );
        Ok(ranked)
    }

    /// One governed completion: budget gate, retried send, cost accounting.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
        purpose: &'static str,
    ) -> Result<String, MenuError> {
        self.governor.check_budget().await?;

        let request = ChatRequest::new(&self.model, messages, options);
        let body = self.send_with_retry(&request, purpose).await?;

        let response: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::invalid_response(format!("undecodable completion envelope: {}", e))
        })?;

        // The endpoint answered, so the call is billed even if the payload
        // turns out to be unusable.
        let cost = response
            .usage
            .as_ref()
            .map(|usage| self.pricing.cost_of(usage))
            .unwrap_or(0.0);
        self.governor.record_spend(cost).await?;

        tracing::debug!(purpose, cost, "Model call completed");

        response
            .into_content()
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::invalid_response("model returned no content").into())
    }

    async fn send_with_retry(
        &self,
        request: &ChatRequest,
        purpose: &'static str,
    ) -> Result<String, MenuError> {
        let mut attempt: u32 = 0;
        loop {
            let error = match self.cancellable(self.transport.send(request)).await? {
                Ok(response) => match classify_http_status(response.status) {
                    None => return Ok(response.body),
                    Some(_) => LlmError::from_status(response.status, &response.body),
                },
                Err(e) => e,
            };

            if !error.is_retryable() {
                tracing::warn!(purpose, kind = ?error.kind, status = ?error.status, "Model call failed");
                return Err(error.into());
            }
            if attempt >= self.retry.max_retries {
                tracing::warn!(
                    purpose,
                    attempts = attempt + 1,
                    kind = ?error.kind,
                    "Model call still failing; giving up"
                );
                return Err(error.into());
            }

            let delay = self.retry.delay_for(attempt);
            tracing::warn!(
                purpose,
                attempt = attempt + 1,
                kind = ?error.kind,
                status = ?error.status,
                delay_ms = delay.as_millis() as u64,
                "Transient model failure; retrying"
            );
            self.cancellable(tokio::time::sleep(delay)).await?;
            attempt += 1;
        }
    }

    async fn cancellable<F: Future>(&self, future: F) -> Result<F::Output, MenuError> {
        match &self.cancel_token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::info!("Model call cancelled");
                    Err(MenuError::Cancelled)
                }
                output = future => Ok(output),
            },
            None => Ok(future.await),
        }
    }
}

/// Base64 data URL for a JPEG menu photo.
fn encode_image(image: &[u8]) -> Result<String, MenuError> {
    if image.is_empty() {
        return Err(MenuError::ImageEncoding("image is empty".to_string()));
    }
    Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(image)))
}

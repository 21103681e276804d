use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{ChatRequest, ChatTransport, CredentialSource, LlmError, TransportResponse};

/// reqwest transport for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiTransport {
    endpoint: Url,
    credentials: Arc<dyn CredentialSource>,
    http: Client,
}

impl OpenAiTransport {
    pub fn new(
        endpoint: &str,
        credentials: Arc<dyn CredentialSource>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            LlmError::invalid_request(format!("invalid model endpoint {:?}: {}", endpoint, e))
        })?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::invalid_request(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            credentials,
            http,
        })
    }
}

#[async_trait]
impl ChatTransport for OpenAiTransport {
    async fn send(&self, request: &ChatRequest) -> Result<TransportResponse, LlmError> {
        let api_key = self
            .credentials
            .api_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::invalid_credentials("no API key configured"))?;

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    LlmError::invalid_request(format!("cannot build model request: {}", e))
                } else {
                    tracing::debug!("Model endpoint transport failure: {}", e);
                    LlmError::transport(format!("model endpoint unreachable: {}", e))
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::transport(format!("failed to read model response: {}", e)))?;

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatOptions, LlmErrorKind, StaticCredentials};

    #[test]
    fn test_rejects_malformed_endpoint() {
        let result = OpenAiTransport::new(
            "not a url",
            Arc::new(StaticCredentials::new("sk-test")),
            Duration::from_secs(5),
        );
        let err = result.err().unwrap();
        assert_eq!(err.kind, LlmErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let transport = OpenAiTransport::new(
            "http://127.0.0.1:9/v1/chat/completions",
            Arc::new(StaticCredentials::missing()),
            Duration::from_secs(5),
        )
        .unwrap();
        let request = ChatRequest::new(
            "gpt-4o",
            vec![],
            ChatOptions {
                temperature: 0.1,
                max_tokens: 10,
            },
        );

        let err = transport.send(&request).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::InvalidCredentials);
    }
}

// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the chat-completions endpoint.
//!
//! Handles request construction, bearer authentication, model selection
//! per tier, and transient error retry (429, 500, 503).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};

use stratos_core::{ModelTier, ReportGenerator, StratosError};

use crate::types::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse};

/// System framing prepended to every report prompt.
const REPORT_SYSTEM_PROMPT: &str =
    "You are a business strategy consultant. Produce a structured, actionable \
     strategy report for the user's question.";

/// Connection settings for the generation endpoint.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub api_key: String,
    pub base_url: String,
    pub standard_model: String,
    pub premium_model: String,
    pub timeout: Duration,
}

/// Chat-completions client with per-tier model selection.
#[derive(Debug, Clone)]
pub struct ReportClient {
    client: reqwest::Client,
    base_url: String,
    standard_model: String,
    premium_model: String,
    max_retries: u32,
}

impl ReportClient {
    pub fn new(options: GenerationOptions) -> Result<Self, StratosError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", options.api_key);
        let mut auth = HeaderValue::from_str(&bearer)
            .map_err(|e| StratosError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|e| StratosError::Generation {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: options.base_url,
            standard_model: options.standard_model,
            premium_model: options.premium_model,
            max_retries: 1,
        })
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Standard => &self.standard_model,
            ModelTier::Premium => &self.premium_model,
        }
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, StratosError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(request)
                .send()
                .await
                .map_err(|e| StratosError::Generation {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| StratosError::Generation {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&body).map_err(|e| StratosError::Generation {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(StratosError::Generation {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "generation API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                )
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(StratosError::Generation {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| StratosError::Generation {
            message: "completion request failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl ReportGenerator for ReportClient {
    async fn generate(
        &self,
        prompt: &str,
        tier: ModelTier,
        max_tokens: u32,
    ) -> Result<String, StratosError> {
        let request = ChatRequest {
            model: self.model_for(tier).to_string(),
            messages: vec![
                ChatMessage::system(REPORT_SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ],
            max_tokens,
        };
        let response = self.complete(&request).await?;
        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| StratosError::Generation {
                message: "API response contained no choices".into(),
                source: None,
            })
    }
}

/// True for status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ReportClient {
        ReportClient::new(GenerationOptions {
            api_key: "test-api-key".into(),
            base_url: base_url.to_string(),
            standard_model: "gpt-4o-mini".into(),
            premium_model: "gpt-4o".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn success_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": text},
                 "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 12, "completion_tokens": 40}
        })
    }

    #[tokio::test]
    async fn generate_returns_first_choice_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("the report")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client
            .generate("Scale my bakery", ModelTier::Premium, 1024)
            .await
            .unwrap();
        assert_eq!(text, "the report");
    }

    #[tokio::test]
    async fn tier_selects_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("standard")))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client
            .generate("q", ModelTier::Standard, 256)
            .await
            .unwrap();
        assert_eq!(text, "standard");
    }

    #[tokio::test]
    async fn retries_once_on_429() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"type": "rate_limit_error", "message": "slow down"}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("after retry")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client.generate("q", ModelTier::Premium, 256).await.unwrap();
        assert_eq!(text, "after retry");
    }

    #[tokio::test]
    async fn fails_without_retry_on_400() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"type": "invalid_request_error", "message": "bad model"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .generate("q", ModelTier::Premium, 256)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid_request_error"));
    }

    #[tokio::test]
    async fn exhausted_retries_surface_last_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": {"type": "overloaded_error", "message": "busy"}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .generate("q", ModelTier::Premium, 256)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("overloaded_error"));
    }

    #[tokio::test]
    async fn empty_choices_are_a_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .generate("q", ModelTier::Premium, 256)
            .await
            .unwrap_err();
        assert!(matches!(err, StratosError::Generation { .. }));
    }
}

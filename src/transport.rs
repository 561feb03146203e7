use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;

#[cfg(test)]
use mockall::automock;

use crate::config::{API_KEY_PLACEHOLDER, ProviderConfig};
use crate::error::{CounterpointError, Result};
use crate::models::ChatRequest;

const MAX_RETRIES: u8 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Seam between the gateway and the wire. Returns the raw provider payload;
/// shape detection happens in `gateway::normalize`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn chat(&self, req: &ChatRequest) -> Result<serde_json::Value>;
}

/// Bearer-authenticated HTTP transport to the completion provider. Exactly
/// one result per call, success or failure; no streaming.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl HttpTransport {
    /// Fails with a configuration error when the credential is absent, so a
    /// misconfigured deployment is diagnosed at startup rather than on the
    /// first user request.
    pub fn new(cfg: &ProviderConfig) -> Result<Self> {
        if cfg.api_key.is_empty() || cfg.api_key == API_KEY_PLACEHOLDER {
            return Err(CounterpointError::Config(
                "GROQ_API_KEY environment variable must be set".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(CounterpointError::Network)?;
        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            endpoint: cfg.base_url.clone(),
        })
    }
}

fn retryable_status(status: reqwest::StatusCode) -> bool {
    status.as_u16() == 429 || status.is_server_error()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn chat(&self, req: &ChatRequest) -> Result<serde_json::Value> {
        let mut attempts = 0u8;

        loop {
            attempts += 1;

            let outcome = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(req)
                .send()
                .await;

            match outcome {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.text().await.map_err(CounterpointError::Network)?;
                        return serde_json::from_str(&body).map_err(|e| {
                            CounterpointError::Malformed {
                                reason: format!("provider returned non-JSON success body: {e}"),
                                raw: serde_json::Value::String(body),
                            }
                        });
                    }

                    if !retryable_status(status) || attempts >= MAX_RETRIES {
                        let body = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        tracing::error!(
                            status = status.as_u16(),
                            attempts,
                            "completion provider returned error status"
                        );
                        return Err(CounterpointError::Api {
                            status: status.as_u16(),
                            body,
                        });
                    }
                }
                Err(e) => {
                    if attempts >= MAX_RETRIES {
                        tracing::error!(attempts, "completion provider unreachable: {e}");
                        return Err(CounterpointError::Network(e));
                    }
                    tracing::warn!(attempts, "transient network error, retrying: {e}");
                }
            }

            // Exponential backoff with jitter before the next attempt
            let base_delay =
                Duration::from_millis(200 * 2u64.pow(attempts.saturating_sub(1) as u32));
            let jitter = rand::thread_rng().gen_range(0.8..=1.2);
            let delay = Duration::from_millis((base_delay.as_millis() as f64 * jitter) as u64);
            sleep(std::cmp::min(delay, Duration::from_secs(10))).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentProfile;

    fn cfg(api_key: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.to_string(),
            base_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.1-70b-versatile".to_string(),
            profile: DeploymentProfile::Standard,
        }
    }

    #[test]
    fn missing_credential_is_a_config_error() {
        let err = HttpTransport::new(&cfg("")).unwrap_err();
        assert!(matches!(err, CounterpointError::Config(_)));
        let err = HttpTransport::new(&cfg(API_KEY_PLACEHOLDER)).unwrap_err();
        assert!(matches!(err, CounterpointError::Config(_)));
    }

    #[test]
    fn present_credential_builds_transport() {
        assert!(HttpTransport::new(&cfg("gsk_test")).is_ok());
    }

    #[test]
    fn only_throttling_and_server_errors_are_retryable() {
        use reqwest::StatusCode;
        assert!(retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!retryable_status(StatusCode::BAD_REQUEST));
        assert!(!retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!retryable_status(StatusCode::NOT_FOUND));
    }
}

//! Moderation service client
//!
//! The engine only depends on the decision contract: given a text and the
//! actor's context, the service answers whether it is flagged, under which
//! categories, and with what confidence.

use crate::error::{ModerationError, Result};
use async_trait::async_trait;
use remedyhub_core::UserId;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Who is submitting the content, as passed to the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: Option<UserId>,
    pub credibility: f64,
    pub context_id: Option<String>,
}

impl ActorContext {
    pub fn guest(baseline: f64) -> Self {
        Self {
            user_id: None,
            credibility: baseline,
            context_id: None,
        }
    }

    pub fn member(user_id: UserId, credibility: f64, context_id: Option<String>) -> Self {
        Self {
            user_id: Some(user_id),
            credibility,
            context_id,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }
}

/// Classifier output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub flagged: bool,
    #[serde(default)]
    pub categories: Vec<String>,
    pub confidence: f64,
}

impl Classification {
    pub fn clean() -> Self {
        Self {
            flagged: false,
            categories: Vec::new(),
            confidence: 0.0,
        }
    }

    pub fn flagged(categories: &[&str], confidence: f64) -> Self {
        Self {
            flagged: true,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            confidence,
        }
    }
}

#[async_trait]
pub trait ModerationClient: Send + Sync {
    async fn classify(&self, text: &str, actor: &ActorContext) -> Result<Classification>;
}

/// Moderation service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationServiceConfig {
    /// Classification endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer credential; falls back to the `api_key_env` variable
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String { "http://127.0.0.1:8089/v1/moderations".to_string() }
fn default_api_key_env() -> String { "REMEDYHUB_MODERATION_API_KEY".to_string() }
fn default_timeout_secs() -> u64 { 10 }

impl Default for ModerationServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ModerationServiceConfig {
    /// Configured credential, else the environment variable, ignoring blanks
    pub fn resolve_api_key(&self) -> Option<String> {
        let is_set = |key: &String| !key.trim().is_empty();
        self.api_key
            .clone()
            .filter(is_set)
            .or_else(|| std::env::var(&self.api_key_env).ok().filter(is_set))
    }
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    input: &'a str,
    actor: &'a ActorContext,
}

/// HTTP client for the moderation service.
///
/// One attempt per call, bounded by the configured timeout. A missing
/// credential is reported before any network I/O.
pub struct HttpModerationClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpModerationClient {
    pub fn new(config: &ModerationServiceConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            ModerationError::InvalidConfig(format!("moderation endpoint '{}': {}", config.endpoint, e))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ModerationError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.resolve_api_key(),
        })
    }

    /// Replace the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModerationError::InvalidConfig(format!("HTTP client: {}", e)))?;
        Ok(self)
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ModerationClient for HttpModerationClient {
    async fn classify(&self, text: &str, actor: &ActorContext) -> Result<Classification> {
        let api_key = self.api_key.as_ref().ok_or(ModerationError::MissingCredential)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&ClassifyRequest { input: text, actor })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, timeout = e.is_timeout(), "Moderation request failed");
                ModerationError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    format!("credential rejected ({})", status)
                }
                _ => format!("unexpected status {}", status),
            };
            return Err(ModerationError::Service(message));
        }

        let classification: Classification = response
            .json()
            .await
            .map_err(|e| ModerationError::Service(format!("undecodable reply: {}", e)))?;

        debug!(
            flagged = classification.flagged,
            confidence = classification.confidence,
            "Moderation classified"
        );
        Ok(classification)
    }
}

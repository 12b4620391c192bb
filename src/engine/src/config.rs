//! Engine configuration loading and validation

use anyhow::{Context, Result};
use remedyhub_moderation::{
    BlacklistConfig, CitationConfig, ModerationPolicy, ModerationServiceConfig, SpamConfig,
};
use remedyhub_reputation::{CredibilityConfig, ReputationConfig, VouchConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete engine configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub reputation: ReputationConfig,

    #[serde(default)]
    pub vouch: VouchConfig,

    #[serde(default)]
    pub credibility: CredibilityConfig,

    #[serde(default)]
    pub moderation: ModerationSection,

    #[serde(default)]
    pub citations: CitationConfig,

    #[serde(default)]
    pub blacklist: BlacklistConfig,

    #[serde(default)]
    pub spam: SpamConfig,

    #[serde(default)]
    pub store: StoreSection,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModerationSection {
    #[serde(flatten)]
    pub service: ModerationServiceConfig,

    #[serde(flatten)]
    pub policy: ModerationPolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreSection {
    /// `memory` or `postgres`
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Parallel recomputations during a sweep
    #[serde(default = "default_sweep_concurrency")]
    pub sweep_concurrency: usize,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_url: None,
            max_connections: default_max_connections(),
            sweep_concurrency: default_sweep_concurrency(),
        }
    }
}

// Default value functions
fn default_backend() -> String { "memory".to_string() }
fn default_max_connections() -> u32 { 10 }
fn default_sweep_concurrency() -> usize { 8 }

impl EngineConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .context("Failed to read configuration file")?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(contents)
            .context("Failed to parse configuration file")?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate reputation
        self.reputation.thresholds.validate()?;
        self.vouch.validate()?;

        // Validate credibility
        let credibility = &self.credibility;
        if credibility.baseline <= 0.0 {
            anyhow::bail!("Credibility baseline must be positive");
        }
        if credibility.max_factor < credibility.baseline {
            anyhow::bail!("Credibility max_factor must be at least the baseline");
        }

        // Validate moderation
        let policy = &self.moderation.policy;
        if !(policy.block_confidence > 0.0 && policy.block_confidence <= 1.0) {
            anyhow::bail!("Moderation block_confidence must be in (0, 1]");
        }
        if !(policy.max_relaxed_confidence >= policy.block_confidence
            && policy.max_relaxed_confidence <= 1.0)
        {
            anyhow::bail!("Moderation max_relaxed_confidence must be between block_confidence and 1.0");
        }
        if self.moderation.service.timeout_secs == 0 {
            anyhow::bail!("Moderation timeout_secs must be positive");
        }

        // Validate spam
        if self.spam.escalation_threshold == 0 {
            anyhow::bail!("Spam escalation_threshold must be positive");
        }

        // Validate store
        match self.store.backend.as_str() {
            "memory" => {}
            "postgres" => {
                if self.store.database_url.is_none() {
                    anyhow::bail!("Postgres store requires database_url");
                }
            }
            other => anyhow::bail!("Store backend must be 'memory' or 'postgres', got '{}'", other),
        }
        if self.store.sweep_concurrency == 0 {
            anyhow::bail!("Store sweep_concurrency must be positive");
        }

        Ok(())
    }
}

//! RemedyHub trust engine CLI
//!
//! Operational commands around the trust engine:
//! - configuration checks
//! - citation validation and blacklist scans against the configured lists
//! - reputation sweeps over the Postgres store

use anyhow::Result;
use clap::Parser;
use remedyhub_engine::EngineConfig;
use remedyhub_moderation::{BlacklistSnapshot, CitationAllowList, CitationValidator};
use std::path::PathBuf;
use tracing::info;

/// RemedyHub trust engine CLI
#[derive(Parser)]
#[command(name = "remedyhub")]
#[command(about = "RemedyHub trust and reputation engine")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/remedyhub.toml", env = "REMEDYHUB_CONFIG")]
    config: PathBuf,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Load and validate the configuration
    CheckConfig,

    /// Validate citations against the allow-list
    ValidateCitation {
        /// Citations (URLs or doi: identifiers)
        #[arg(required = true)]
        citations: Vec<String>,
    },

    /// Scan text for blacklisted keywords
    Scan {
        /// Text to scan
        text: String,
    },

    /// Recompute reputation for every profile
    #[cfg(feature = "postgres")]
    Sweep {
        /// Parallel recomputations (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Print Prometheus metrics after the sweep
        #[arg(long)]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},remedyhub=debug", log_level).into())
        )
        .with_target(true)
        .with_line_number(true)
        .init();

    let mut config = if cli.config.exists() {
        let config = EngineConfig::load(&cli.config)?;
        info!("Loaded configuration from {:?}", cli.config);
        config
    } else {
        info!("No configuration at {:?}, using defaults", cli.config);
        EngineConfig::default()
    };

    // Apply CLI overrides
    if let Some(database_url) = cli.database_url {
        config.store.database_url = Some(database_url);
    }

    config.validate()?;

    match cli.command {
        Command::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
            info!("Configuration is valid");
        }
        Command::ValidateCitation { citations } => {
            let validator = CitationValidator::new(CitationAllowList::from_config(&config.citations));
            let mut rejected = 0;
            for citation in &citations {
                let result = validator.validate(citation);
                if !result.is_valid {
                    rejected += 1;
                }
                println!("{}\t{}", citation, serde_json::to_string(&result)?);
            }
            if rejected > 0 {
                anyhow::bail!("{} of {} citations rejected", rejected, citations.len());
            }
        }
        Command::Scan { text } => {
            let snapshot = BlacklistSnapshot::new(config.blacklist.keywords.clone());
            let matches = snapshot.scan(&text);
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        #[cfg(feature = "postgres")]
        Command::Sweep { concurrency, metrics } => {
            sweep(&config, concurrency, metrics).await?;
        }
    }

    Ok(())
}

#[cfg(feature = "postgres")]
async fn sweep(config: &EngineConfig, concurrency: Option<usize>, print_metrics: bool) -> Result<()> {
    use anyhow::Context;
    use prometheus::{Encoder, TextEncoder};
    use remedyhub_core::PostgresTrustStore;
    use remedyhub_reputation::{get_registry, register_metrics, ReputationEngine};
    use std::sync::Arc;

    let database_url = config
        .store
        .database_url
        .as_deref()
        .context("database_url is required for a sweep")?;

    let store = PostgresTrustStore::new(database_url, config.store.max_connections).await?;
    store.run_migrations().await?;

    let metrics = register_metrics()?;
    let engine = ReputationEngine::new(Arc::new(store), config.reputation.clone()).with_metrics(metrics);

    let concurrency = concurrency.unwrap_or(config.store.sweep_concurrency);
    info!("Starting reputation sweep (concurrency={})", concurrency);
    let report = engine.recompute_all(concurrency).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if print_metrics {
        if let Some(registry) = get_registry() {
            let mut buffer = Vec::new();
            TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
            print!("{}", String::from_utf8_lossy(&buffer));
        }
    }

    if !report.failed.is_empty() {
        anyhow::bail!("{} profiles failed to recompute", report.failed.len());
    }
    Ok(())
}

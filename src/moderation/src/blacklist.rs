//! Keyword blacklist filter
//!
//! Scanning is pure over an immutable [`BlacklistSnapshot`]. The
//! [`BlacklistCache`] owns the current snapshot and reloads it from a
//! [`KeywordSource`] on a fixed cadence. A failed reload keeps serving the
//! previous snapshot.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Read-only keyword list, in blacklist order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistSnapshot {
    keywords: Vec<String>,
    lowered: Vec<String>,
    loaded_at: DateTime<Utc>,
}

impl BlacklistSnapshot {
    /// Build a snapshot; blank entries and case-insensitive duplicates are dropped
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept = Vec::new();
        let mut lowered: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword: String = keyword.into();
            let keyword = keyword.trim();
            if keyword.is_empty() {
                continue;
            }
            let lower = keyword.to_lowercase();
            if lowered.contains(&lower) {
                continue;
            }
            kept.push(keyword.to_string());
            lowered.push(lower);
        }
        Self {
            keywords: kept,
            lowered,
            loaded_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Case-insensitive substring scan
    pub fn scan(&self, text: &str) -> MatchSet {
        let haystack = text.to_lowercase();
        let matches = self
            .keywords
            .iter()
            .zip(&self.lowered)
            .filter(|(_, lower)| haystack.contains(lower.as_str()))
            .map(|(keyword, _)| keyword.clone())
            .collect();
        MatchSet(matches)
    }
}

/// Keywords found in a text, in blacklist order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSet(Vec<String>);

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keywords(&self) -> &[String] {
        &self.0
    }

    /// Flag reasons recorded on auto-flagged content
    pub fn flag_reasons(&self) -> Vec<String> {
        self.0.iter().map(|k| format!("blacklisted keyword: {}", k)).collect()
    }
}

/// Scan `text` against a snapshot
pub fn scan(text: &str, snapshot: &BlacklistSnapshot) -> MatchSet {
    snapshot.scan(text)
}

/// Where the persisted blacklist is loaded from
#[async_trait]
pub trait KeywordSource: Send + Sync {
    async fn load(&self) -> Result<Vec<String>>;
}

/// Fixed list, typically from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticKeywordSource {
    keywords: Vec<String>,
}

impl StaticKeywordSource {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }
}

#[async_trait]
impl KeywordSource for StaticKeywordSource {
    async fn load(&self) -> Result<Vec<String>> {
        Ok(self.keywords.clone())
    }
}

/// Blacklist settings from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistConfig {
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Seconds between reloads from the keyword source (default: 300)
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_refresh_secs() -> u64 { 300 }

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

struct CacheState {
    snapshot: Option<Arc<BlacklistSnapshot>>,
    last_attempt: Option<Instant>,
}

/// Current blacklist snapshot with periodic reload
pub struct BlacklistCache {
    source: Arc<dyn KeywordSource>,
    refresh_every: Duration,
    state: RwLock<CacheState>,
    reload: tokio::sync::Mutex<()>,
}

impl BlacklistCache {
    pub fn new(source: Arc<dyn KeywordSource>, refresh_every: Duration) -> Self {
        Self {
            source,
            refresh_every,
            state: RwLock::new(CacheState {
                snapshot: None,
                last_attempt: None,
            }),
            reload: tokio::sync::Mutex::new(()),
        }
    }

    pub fn from_config(source: Arc<dyn KeywordSource>, config: &BlacklistConfig) -> Self {
        Self::new(source, Duration::from_secs(config.refresh_secs))
    }

    /// Snapshot currently held, without reloading
    pub fn current(&self) -> Option<Arc<BlacklistSnapshot>> {
        self.state.read().snapshot.clone()
    }

    fn is_due(&self) -> bool {
        let state = self.state.read();
        match state.last_attempt {
            None => true,
            Some(at) => at.elapsed() >= self.refresh_every,
        }
    }

    /// Snapshot to scan with, reloading first when the cadence has elapsed.
    ///
    /// Never fails: a reload error keeps the previous snapshot, or an empty
    /// one if nothing was ever loaded.
    pub async fn snapshot(&self) -> Arc<BlacklistSnapshot> {
        if self.is_due() {
            let _guard = self.reload.lock().await;
            // another caller may have reloaded while we waited
            if self.is_due() {
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "Blacklist reload failed, keeping previous snapshot");
                }
            }
        }
        self.current()
            .unwrap_or_else(|| Arc::new(BlacklistSnapshot::empty()))
    }

    /// Reload from the source now
    pub async fn refresh(&self) -> Result<Arc<BlacklistSnapshot>> {
        let loaded = self.source.load().await;
        let mut state = self.state.write();
        state.last_attempt = Some(Instant::now());
        let keywords = loaded?;

        let snapshot = Arc::new(BlacklistSnapshot::new(keywords));
        debug!(keywords = snapshot.len(), "Blacklist snapshot loaded");
        state.snapshot = Some(snapshot.clone());
        Ok(snapshot)
    }
}

impl std::fmt::Debug for BlacklistCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlacklistCache")
            .field("refresh_every", &self.refresh_every)
            .field("keywords", &self.current().map(|s| s.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModerationError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FlakySource {
        keywords: parking_lot::Mutex<Vec<String>>,
        failing: AtomicBool,
        loads: AtomicUsize,
    }

    impl FlakySource {
        fn new(keywords: &[&str]) -> Self {
            Self {
                keywords: parking_lot::Mutex::new(keywords.iter().map(|k| k.to_string()).collect()),
                failing: AtomicBool::new(false),
                loads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl KeywordSource for FlakySource {
        async fn load(&self) -> Result<Vec<String>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ModerationError::KeywordSource("table unavailable".into()));
            }
            Ok(self.keywords.lock().clone())
        }
    }

    #[test]
    fn test_scan_is_case_insensitive_and_ordered() {
        let snapshot = BlacklistSnapshot::new(["miracle cure", "Detox", "guaranteed"]);
        let matches = scan("GUARANTEED results from this MIRACLE CURE", &snapshot);
        assert_eq!(matches.keywords(), &["miracle cure".to_string(), "guaranteed".to_string()]);
    }

    #[test]
    fn test_scan_matches_substrings() {
        let snapshot = BlacklistSnapshot::new(["detox"]);
        assert_eq!(snapshot.scan("Try our DETOXIFYING tea").len(), 1);
        assert!(snapshot.scan("clean text").is_empty());
    }

    #[test]
    fn test_snapshot_drops_blank_and_duplicate_entries() {
        let snapshot = BlacklistSnapshot::new(["cure", " ", "CURE", "", "scam"]);
        assert_eq!(snapshot.keywords(), &["cure".to_string(), "scam".to_string()]);
    }

    #[test]
    fn test_flag_reasons() {
        let snapshot = BlacklistSnapshot::new(["scam"]);
        let reasons = snapshot.scan("total scam").flag_reasons();
        assert_eq!(reasons, vec!["blacklisted keyword: scam".to_string()]);
    }

    #[tokio::test]
    async fn test_cache_loads_once_within_cadence() {
        let source = Arc::new(FlakySource::new(&["scam"]));
        let cache = BlacklistCache::new(source.clone(), Duration::from_secs(3600));

        let first = cache.snapshot().await;
        let second = cache.snapshot().await;
        assert_eq!(first.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_reloads_when_due() {
        let source = Arc::new(FlakySource::new(&["scam"]));
        let cache = BlacklistCache::new(source.clone(), Duration::ZERO);

        assert_eq!(cache.snapshot().await.len(), 1);
        source.keywords.lock().push("miracle".into());
        assert_eq!(cache.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_snapshot() {
        let source = Arc::new(FlakySource::new(&["scam"]));
        let cache = BlacklistCache::new(source.clone(), Duration::ZERO);
        cache.snapshot().await;

        source.failing.store(true, Ordering::SeqCst);
        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.keywords(), &["scam".to_string()]);
        assert!(cache.refresh().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_first_load_serves_empty() {
        let source = Arc::new(FlakySource::new(&["scam"]));
        source.failing.store(true, Ordering::SeqCst);
        let cache = BlacklistCache::new(source, Duration::from_secs(60));

        assert!(cache.snapshot().await.is_empty());
        assert!(cache.current().is_none());
    }
}

//! Spam reports
//!
//! One report per (reporter, reported) pair. Repeats are benign and return
//! the current count. Reaching the escalation threshold is reported to the
//! caller; acting on it (a ban) happens outside the engine.

use crate::error::{ModerationError, Result};
use remedyhub_core::{ProfileStore, ReportInsert, SpamReport, SpamReportStore, TrustStore, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpamConfig {
    /// Distinct reporters that escalate a member for review (default: 3)
    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: u32,

    /// Longest accepted reason (default: 1000 characters)
    #[serde(default = "default_max_reason_len")]
    pub max_reason_len: usize,
}

fn default_escalation_threshold() -> u32 { 3 }
fn default_max_reason_len() -> usize { 1000 }

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: default_escalation_threshold(),
            max_reason_len: default_max_reason_len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpamReportOutcome {
    pub success: bool,
    pub duplicate: bool,
    pub distinct_reporters: u32,
    pub escalate: bool,
}

#[derive(Clone)]
pub struct SpamReportDesk {
    store: Arc<dyn TrustStore>,
    config: SpamConfig,
}

impl SpamReportDesk {
    pub fn new(store: Arc<dyn TrustStore>, config: SpamConfig) -> Self {
        Self { store, config }
    }

    pub async fn report_spam(
        &self,
        reporter_id: &UserId,
        reported_id: &UserId,
        reason: &str,
    ) -> Result<SpamReportOutcome> {
        if reporter_id.is_blank() || reported_id.is_blank() {
            return Err(ModerationError::InvalidReport("user id is empty".to_string()));
        }
        if reporter_id == reported_id {
            return Err(ModerationError::InvalidReport(
                "members cannot report themselves".to_string(),
            ));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ModerationError::InvalidReport("reason is empty".to_string()));
        }
        if reason.chars().count() > self.config.max_reason_len {
            return Err(ModerationError::InvalidReport(format!(
                "reason exceeds {} characters",
                self.config.max_reason_len
            )));
        }

        for user_id in [reporter_id, reported_id] {
            if self.store.get_profile(user_id).await?.is_none() {
                return Err(ModerationError::UnknownUser(user_id.clone()));
            }
        }

        let report = SpamReport::new(reporter_id.clone(), reported_id.clone(), reason.to_string());
        let (duplicate, distinct_reporters) = match self.store.insert_report(report).await? {
            ReportInsert::Inserted { distinct_reporters } => (false, distinct_reporters),
            ReportInsert::Duplicate { distinct_reporters } => {
                debug!(reporter = %reporter_id, reported = %reported_id, "Duplicate spam report ignored");
                (true, distinct_reporters)
            }
        };

        let escalate = distinct_reporters >= self.config.escalation_threshold;
        if escalate && !duplicate && distinct_reporters == self.config.escalation_threshold {
            info!(reported = %reported_id, distinct_reporters, "Spam reports reached escalation threshold");
        }

        Ok(SpamReportOutcome {
            success: true,
            duplicate,
            distinct_reporters,
            escalate,
        })
    }

    /// Reports filed against a member, oldest first
    pub async fn reports_against(&self, reported_id: &UserId) -> Result<Vec<SpamReport>> {
        Ok(self.store.reports_against(reported_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remedyhub_core::{InMemoryTrustStore, Profile};

    async fn desk(users: &[&str]) -> SpamReportDesk {
        let store = InMemoryTrustStore::new();
        for user in users {
            store
                .insert_profile_if_absent(Profile::new(UserId::new(*user)))
                .await
                .unwrap();
        }
        SpamReportDesk::new(Arc::new(store), SpamConfig::default())
    }

    #[tokio::test]
    async fn test_duplicate_report_is_benign() {
        let desk = desk(&["a", "spammer"]).await;
        let (a, spammer) = (UserId::new("a"), UserId::new("spammer"));

        let first = desk.report_spam(&a, &spammer, "link farm").await.unwrap();
        assert!(!first.duplicate);
        assert_eq!(first.distinct_reporters, 1);

        let again = desk.report_spam(&a, &spammer, "still spamming").await.unwrap();
        assert!(again.success && again.duplicate);
        assert_eq!(again.distinct_reporters, 1);
        assert_eq!(desk.reports_against(&spammer).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_escalation_at_threshold() {
        let desk = desk(&["a", "b", "c", "spammer"]).await;
        let spammer = UserId::new("spammer");

        let mut last = None;
        for reporter in ["a", "b", "c"] {
            last = Some(desk.report_spam(&UserId::new(reporter), &spammer, "spam").await.unwrap());
        }
        let last = last.unwrap();
        assert_eq!(last.distinct_reporters, 3);
        assert!(last.escalate);
    }

    #[tokio::test]
    async fn test_validation() {
        let desk = desk(&["a", "b"]).await;
        let (a, b) = (UserId::new("a"), UserId::new("b"));

        assert!(matches!(
            desk.report_spam(&a, &a, "spam").await,
            Err(ModerationError::InvalidReport(_))
        ));
        assert!(matches!(
            desk.report_spam(&a, &b, "  ").await,
            Err(ModerationError::InvalidReport(_))
        ));
        assert!(matches!(
            desk.report_spam(&UserId::new(""), &b, "spam").await,
            Err(ModerationError::InvalidReport(_))
        ));
        assert!(matches!(
            desk.report_spam(&a, &UserId::new("ghost"), "spam").await,
            Err(ModerationError::UnknownUser(_))
        ));
    }
}

//! Content admission for RemedyHub
//!
//! Every review, comment, or profile claim passes three checks before it
//! can influence trust:
//!
//! 1. **CitationValidator**: citations must be `doi:` identifiers or URLs on
//!    the allow-list
//! 2. **KeywordBlacklistFilter**: blacklisted phrases auto-flag the content
//!    (stored, hidden, not rejected)
//! 3. **ModerationGateway**: external classifier, fail-closed, with
//!    credibility relaxation for established members
//!
//! Spam reports are filed through the [`SpamReportDesk`].

pub mod citation;
pub mod blacklist;
pub mod client;
pub mod gateway;
pub mod reports;
pub mod error;

pub use citation::{
    CitationAllowList, CitationConfig, CitationFormat, CitationValidationResult, CitationValidator,
    DOI_DOMAIN,
};
pub use blacklist::{
    scan, BlacklistCache, BlacklistConfig, BlacklistSnapshot, KeywordSource, MatchSet,
    StaticKeywordSource,
};
pub use client::{
    ActorContext, Classification, HttpModerationClient, ModerationClient, ModerationServiceConfig,
};
pub use gateway::{ModerationGateway, ModerationPolicy, ModerationVerdict};
pub use reports::{SpamConfig, SpamReportDesk, SpamReportOutcome};
pub use error::{ModerationError, Result};

//! RemedyHub Trust Engine
//!
//! Facade over the trust subsystems: content admission, reputation,
//! vouching, spam reports, and role authorization, configured from a single
//! TOML file.

pub mod config;
pub mod engine;
pub mod error;

pub use config::{EngineConfig, ModerationSection, StoreSection};
pub use engine::{Identity, ReviewDraft, ReviewReceipt, TrustEngine, UnflagReceipt};
pub use error::{EngineError, Result};

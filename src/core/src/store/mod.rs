//! Store implementations

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::InMemoryTrustStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresTrustStore;

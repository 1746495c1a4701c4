//! ClassKeeper core library.
//!
//! This crate provides the foundational components for keeping directory
//! accounts aligned with the school catalog: configuration, the canonical
//! identity record model with its per-role mappers, the login naming
//! engine, account-control flag algebra, and the encrypted credential
//! backup/restore store.

pub mod config;
pub mod errors;
pub mod flags;
pub mod model;
pub mod naming;
pub mod source;
pub mod store;

// Re-exports for convenience.
pub use config::AppConfig;
pub use errors::CoreError;
pub use model::Record;
pub use source::CredentialSource;
pub use store::{BackupOutcome, CredentialStore, RestoreOutcome};

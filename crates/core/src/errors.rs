//! Error types for the ClassKeeper core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Flag(#[from] FlagError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue {
        field: String,
        detail: String,
    },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Flag algebra errors
// ---------------------------------------------------------------------------

/// Errors from the account-control flag algebra.
#[derive(Debug, Error)]
pub enum FlagError {
    /// A string-typed account-control value did not parse as an integer.
    #[error("malformed account-control value '{0}'")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Credential store errors
// ---------------------------------------------------------------------------

/// Errors from the credential backup/restore store.
///
/// These surface from the internal load/save helpers; the store absorbs
/// them at its public boundary (logged, never propagated) so a damaged or
/// unreadable history file cannot abort a run.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Encryption or decryption failed (wrong passphrase, corrupted file,
    /// or a key-derivation problem).
    #[error("credential store encryption error: {0}")]
    Encryption(String),

    /// The decrypted payload could not be decompressed or deserialized.
    #[error("credential store payload error: {0}")]
    Payload(String),

    /// Generic I/O error on the backing file.
    #[error("credential store I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Source-system errors
// ---------------------------------------------------------------------------

/// Errors from the external credential source collaborator (the system of
/// record holding the live administrative accounts).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source system could not be reached.
    #[error("credential source unavailable: {0}")]
    Unavailable(String),

    /// A lookup against the source system failed.
    #[error("credential source query failed: {0}")]
    QueryFailed(String),

    /// The source system rejected a write-back.
    #[error("credential write-back rejected: {0}")]
    WriteRejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = FlagError::Malformed("66O48".into());
        assert_eq!(err.to_string(), "malformed account-control value '66O48'");

        let err = ConfigError::InvalidValue {
            field: "directory.domain".into(),
            detail: "must not be empty".into(),
        };
        assert!(err.to_string().contains("directory.domain"));

        let err = StoreError::Encryption("bad tag".into());
        assert!(err.to_string().contains("encryption"));
    }

    #[test]
    fn test_core_error_from_subsystem() {
        let flag_err = FlagError::Malformed("x".into());
        let core_err: CoreError = flag_err.into();
        assert!(matches!(core_err, CoreError::Flag(_)));

        let src_err = SourceError::Unavailable("connection refused".into());
        let core_err: CoreError = src_err.into();
        assert!(matches!(core_err, CoreError::Source(_)));
    }
}

//! Access to the live credential records in the catalog.

use crate::errors::SourceError;
use crate::store::snapshot::CredentialSnapshot;

/// Reads and writes the live credential state of privileged internal
/// accounts. The production implementation sits on the catalog connector;
/// tests substitute an in-memory one.
pub trait CredentialSource {
    /// Current state of the account, or `None` when the login is unknown.
    fn fetch_current(&self, login: &str) -> Result<Option<CredentialSnapshot>, SourceError>;

    /// Write a snapshot's password fields back to the live account.
    /// Returns `false` when the backend accepted the request but changed
    /// nothing.
    fn write_back(&self, snapshot: &CredentialSnapshot) -> Result<bool, SourceError>;
}

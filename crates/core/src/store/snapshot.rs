//! Credential snapshot value type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Login literal denoting the system administrator account.
pub const ADMIN_LOGIN: &str = "*";

/// One captured state of a privileged internal account. Snapshots are
/// immutable once taken; every change to the live account produces a new
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSnapshot {
    pub internal_id: String,
    /// Account login; [`ADMIN_LOGIN`] for the administrator.
    pub login: String,
    pub account_type: String,
    pub permission_code: String,
    pub update_type: String,
    pub form_code: String,
    pub password_hash: Option<String>,
    pub password_method: Option<String>,
    pub password_salt: Option<String>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: String,
}

impl CredentialSnapshot {
    /// Whether the stored password differs from `other`'s.
    ///
    /// Only hash, method and salt participate. Two absent values compare
    /// equal; absent versus present is a difference. The hash comparison
    /// itself is constant-time.
    pub fn password_differs(&self, other: &CredentialSnapshot) -> bool {
        !opt_ct_eq(&self.password_hash, &other.password_hash)
            || self.password_method != other.password_method
            || self.password_salt != other.password_salt
    }
}

fn opt_ct_eq(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.as_bytes().ct_eq(b.as_bytes()).into(),
        _ => false,
    }
}

//! Encrypted, versioned backup store for privileged-account credentials.
//!
//! The whole history database is the unit of persistence: it is loaded
//! once, lazily, on first use and rewritten in full on every accepted
//! backup. On disk it is a JSON document, gzip-compressed and sealed with
//! the operator passphrase (see [`crypto`]).
//!
//! I/O and decryption failures are logged and absorbed. A store whose
//! backing file cannot be read keeps running against an empty in-memory
//! database; it still records and restores versions, but withholds file
//! rewrites so the unreadable history is not overwritten.

pub mod crypto;
pub mod snapshot;

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::errors::StoreError;
use crate::source::CredentialSource;
use snapshot::CredentialSnapshot;

/// Default file name of the history database.
pub const DEFAULT_STORE_FILE: &str = "users.dat";

// ---------------------------------------------------------------------------
// History database
// ---------------------------------------------------------------------------

/// Versioned credential history, login → ordered versions.
///
/// Versions stay in insertion order, which matches timestamp order as long
/// as backups are taken forward in time; index-based restore is defined
/// over this order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryDatabase {
    entries: BTreeMap<String, Vec<(DateTime<Utc>, CredentialSnapshot)>>,
}

impl HistoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a history file directly, without going through a
    /// [`CredentialStore`]. Used for offline inspection; unlike the store
    /// this propagates failures to the caller.
    pub fn load(path: &Path, passphrase: &str) -> Result<Self, StoreError> {
        load_database(path, passphrase)
    }

    /// Record a snapshot keyed at its modification timestamp. Returns
    /// `false` when an identical version is already stored for this login
    /// (nothing is added then).
    pub fn record(&mut self, snapshot: CredentialSnapshot) -> bool {
        let versions = self.entries.entry(snapshot.login.clone()).or_default();
        if versions.iter().any(|(_, existing)| *existing == snapshot) {
            return false;
        }
        versions.push((snapshot.modified_at, snapshot));
        true
    }

    /// All stored versions for a login, oldest first.
    pub fn versions(&self, login: &str) -> &[(DateTime<Utc>, CredentialSnapshot)] {
        self.entries.get(login).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Logins with at least one stored version.
    pub fn logins(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Snapshot stored at exactly `at` for `login`.
    pub fn find_at(&self, login: &str, at: DateTime<Utc>) -> Option<&CredentialSnapshot> {
        self.versions(login)
            .iter()
            .find(|(ts, _)| *ts == at)
            .map(|(_, snap)| snap)
    }

    /// Snapshot at `index` in insertion order; negative indices count from
    /// the end (`-1` is the most recent version).
    pub fn find_index(&self, login: &str, index: isize) -> Option<&CredentialSnapshot> {
        let versions = self.versions(login);
        let resolved = if index < 0 {
            versions.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        versions.get(resolved).map(|(_, snap)| snap)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a backup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A new version was recorded.
    Stored,
    /// The live state duplicates an already stored version.
    Unchanged,
    /// The live state could not be read from the source.
    Unavailable,
}

/// Result of a restore attempt. Distinguishes "nothing to restore" from
/// "found it but could not write it back".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    /// Unknown login, timestamp or out-of-range index.
    NotFound,
    /// The matching snapshot exists but the write-back failed.
    WriteFailed,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The backup/restore store. Constructed once and passed to whatever
/// needs it; owns the lazily loaded [`HistoryDatabase`] and the live
/// credential source.
pub struct CredentialStore<S: CredentialSource> {
    path: PathBuf,
    passphrase: String,
    source: S,
    /// `None` until the first access (load, or first-use creation).
    db: Option<HistoryDatabase>,
    /// Set when a backing file exists but could not be read; blocks
    /// rewrites so the unreadable history is not destroyed.
    persist_blocked: bool,
}

impl<S: CredentialSource> CredentialStore<S> {
    pub fn new(path: impl Into<PathBuf>, passphrase: impl Into<String>, source: S) -> Self {
        Self {
            path: path.into(),
            passphrase: passphrase.into(),
            source,
            db: None,
            persist_blocked: false,
        }
    }

    /// Capture the live state of `login` as a new version if it differs
    /// from everything already stored. An accepted backup rewrites the
    /// whole database file; a failed rewrite is logged and absorbed (the
    /// version stays recorded in memory).
    pub fn backup(&mut self, login: &str) -> BackupOutcome {
        let snapshot = match self.source.fetch_current(login) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                warn!(login, "backup requested for an unknown account");
                return BackupOutcome::Unavailable;
            }
            Err(e) => {
                error!(login, error = %e, "could not read live credential state");
                return BackupOutcome::Unavailable;
            }
        };

        if !self.database_mut().record(snapshot) {
            debug!(login, "live state matches a stored version, nothing to do");
            return BackupOutcome::Unchanged;
        }

        info!(login, "recorded a new credential version");
        if self.persist_blocked {
            warn!(path = %self.path.display(),
                "backing file is unreadable, keeping the new version in memory only");
        } else if let Err(e) = self.persist() {
            warn!(path = %self.path.display(), error = %e, "history rewrite failed");
        }
        BackupOutcome::Stored
    }

    /// Restore the version stored at exactly `at`.
    pub fn restore_at(&mut self, login: &str, at: DateTime<Utc>) -> RestoreOutcome {
        match self.database_mut().find_at(login, at) {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                self.write_back(login, &snapshot)
            }
            None => {
                warn!(login, at = %at, "no stored version at that timestamp");
                RestoreOutcome::NotFound
            }
        }
    }

    /// Restore by position in insertion order; `-1` is the latest version.
    pub fn restore_index(&mut self, login: &str, index: isize) -> RestoreOutcome {
        match self.database_mut().find_index(login, index) {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                self.write_back(login, &snapshot)
            }
            None => {
                warn!(login, index, "no stored version at that index");
                RestoreOutcome::NotFound
            }
        }
    }

    /// Restore the most recent version.
    pub fn restore_latest(&mut self, login: &str) -> RestoreOutcome {
        self.restore_index(login, -1)
    }

    /// Stored versions for a login, oldest first. `None` when the login
    /// has no history at all.
    pub fn list(&mut self, login: &str) -> Option<Vec<(DateTime<Utc>, CredentialSnapshot)>> {
        let versions = self.database_mut().versions(login);
        if versions.is_empty() {
            None
        } else {
            Some(versions.to_vec())
        }
    }

    /// The live credential source backing this store.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// All logins with stored history.
    pub fn logins(&mut self) -> Vec<String> {
        self.database_mut().logins().map(String::from).collect()
    }

    fn write_back(&self, login: &str, snapshot: &CredentialSnapshot) -> RestoreOutcome {
        match self.source.write_back(snapshot) {
            Ok(true) => {
                info!(login, at = %snapshot.modified_at, "restored credential version");
                RestoreOutcome::Restored
            }
            Ok(false) => {
                warn!(login, "backend rejected the credential write");
                RestoreOutcome::WriteFailed
            }
            Err(e) => {
                error!(login, error = %e, "credential write failed");
                RestoreOutcome::WriteFailed
            }
        }
    }

    /// Lazy load. An unreadable backing file is logged and absorbed: the
    /// store carries on with an empty in-memory database but blocks file
    /// rewrites so the unreadable history survives.
    fn database_mut(&mut self) -> &mut HistoryDatabase {
        if self.db.is_none() {
            let db = match load_database(&self.path, &self.passphrase) {
                Ok(db) => db,
                Err(e) => {
                    error!(path = %self.path.display(), error = %e,
                        "history database unreadable, continuing in memory only");
                    self.persist_blocked = true;
                    HistoryDatabase::new()
                }
            };
            self.db = Some(db);
        }
        self.db.get_or_insert_with(HistoryDatabase::new)
    }

    fn persist(&self) -> Result<(), StoreError> {
        let db = match &self.db {
            Some(db) => db,
            None => return Ok(()),
        };
        save_database(&self.path, &self.passphrase, db)
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

fn load_database(path: &Path, passphrase: &str) -> Result<HistoryDatabase, StoreError> {
    if !path.exists() {
        info!(path = %path.display(), "no history file yet, starting empty");
        return Ok(HistoryDatabase::new());
    }

    let blob = std::fs::read(path)?;
    let compressed = crypto::open(passphrase, &blob)?;

    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|e| StoreError::Payload(format!("decompression failed: {e}")))?;

    serde_json::from_slice(&json)
        .map_err(|e| StoreError::Payload(format!("history document malformed: {e}")))
}

fn save_database(
    path: &Path,
    passphrase: &str,
    db: &HistoryDatabase,
) -> Result<(), StoreError> {
    let json = serde_json::to_vec(db)
        .map_err(|e| StoreError::Payload(format!("history serialization failed: {e}")))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .and_then(|_| encoder.finish())
        .map_err(|e| StoreError::Payload(format!("compression failed: {e}")))
        .and_then(|compressed| crypto::seal(passphrase, &compressed))
        .and_then(|blob| std::fs::write(path, blob).map_err(StoreError::from))
}

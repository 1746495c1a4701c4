//! Canonical identity record model.
//!
//! A person known to the system appears in up to two places: the school
//! catalog (the relational system of record) and the directory service.
//! The types here hold the reconciled, typed view of one person; they are
//! constructed exclusively by the mappers in [`mapping`] and never mutated
//! afterwards. In particular, `paired`/`partial` are owned by the mappers:
//! a record built from a single source is `partial`, a record reconciled
//! from both sources is `paired`, and exactly one of the two is ever true.

pub mod mapping;
pub mod source;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared base
// ---------------------------------------------------------------------------

/// Base attributes shared by every role variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBase {
    /// Authoritative key from the school catalog (also tagged onto the
    /// directory object).
    pub internal_id: String,
    pub surname: String,
    pub given_name: String,
    pub display_name: String,
    pub email: String,
    /// Directory distinguished name, empty when not provisioned.
    pub dn: String,
    /// Reconciled from both sources.
    pub paired: bool,
    /// Built from a single source only.
    pub partial: bool,
}

impl PersonBase {
    /// Whether the pairing flags are in a legal state (`partial` and
    /// `paired` are mutually exclusive and one must hold).
    pub fn pairing_consistent(&self) -> bool {
        self.partial != self.paired
    }
}

// ---------------------------------------------------------------------------
// Role variants
// ---------------------------------------------------------------------------

/// A student of the school.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub base: PersonBase,

    /// Class label in the form "year.letter" ("5.A").
    pub class_label: String,
    /// Class year 1–9; 0 when unknown or unparseable.
    pub class_year: u8,
    pub class_letter: String,
    /// Position in the class roster.
    pub class_number: String,

    /// Principal name (login with domain).
    pub principal_name: String,
    /// Short logon name, max 20 characters.
    pub logon_name: String,
    /// Directory account-control bitmask.
    pub account_control: u32,
    /// Job title attribute; surfaces in the mail suite address book.
    pub title: String,
    /// External mail delivery is restricted for this account.
    pub ext_mail_restricted: bool,

    /// Snapshot of rule-managed directory attributes (name → value) taken
    /// from the directory source. Input for convergent reconciliation: an
    /// attribute present here but assigned by no rule must be cleared.
    pub rule_attributes: BTreeMap<String, String>,

    /// Primary guardian reference, copied via the catalog join.
    pub guardian_id: String,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub guardian_email: String,

    /// End of catalog registration, when set.
    pub expires: String,

    pub proxy_addresses: Vec<String>,
    pub last_logon: Option<DateTime<Utc>>,
    pub password_last_set: Option<DateTime<Utc>>,
    /// Distinguished names of directory groups this account belongs to.
    pub groups: Vec<String>,
}

/// A faculty member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyRecord {
    pub base: PersonBase,

    /// Class label if this person is a class teacher.
    pub class_teacher_of: Option<String>,
    /// Active in the current school year.
    pub active_this_year: bool,
}

/// A legal guardian, kept in the directory as a mail contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianRecord {
    pub base: PersonBase,

    pub phone: String,
    /// Hidden from the global address list.
    pub gal_hidden: bool,
    /// Senders must authenticate to deliver to this contact.
    pub require_auth: bool,
    /// Distinguished names of distribution groups.
    pub distribution_lists: Vec<String>,
}

/// A former student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlumniRecord {
    pub base: PersonBase,

    /// Year the student left the school; 0 when unknown.
    pub graduation_year: u16,
}

// ---------------------------------------------------------------------------
// Tagged variant
// ---------------------------------------------------------------------------

/// Any identity record, tagged by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Record {
    Student(StudentRecord),
    Faculty(FacultyRecord),
    Guardian(GuardianRecord),
    Alumni(AlumniRecord),
}

impl Record {
    /// Shared base attributes regardless of role.
    pub fn base(&self) -> &PersonBase {
        match self {
            Record::Student(r) => &r.base,
            Record::Faculty(r) => &r.base,
            Record::Guardian(r) => &r.base,
            Record::Alumni(r) => &r.base,
        }
    }

    pub fn role_name(&self) -> &'static str {
        match self {
            Record::Student(_) => "student",
            Record::Faculty(_) => "faculty",
            Record::Guardian(_) => "guardian",
            Record::Alumni(_) => "alumni",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairing_consistency() {
        let mut base = PersonBase::default();
        assert!(!base.pairing_consistent());

        base.partial = true;
        assert!(base.pairing_consistent());

        base.paired = true;
        assert!(!base.pairing_consistent());
    }

    #[test]
    fn test_record_base_access() {
        let record = Record::Faculty(FacultyRecord {
            base: PersonBase {
                internal_id: "UC042".into(),
                surname: "Hrubá".into(),
                ..Default::default()
            },
            class_teacher_of: Some("7.B".into()),
            active_this_year: true,
        });
        assert_eq!(record.base().internal_id, "UC042");
        assert_eq!(record.role_name(), "faculty");
    }
}

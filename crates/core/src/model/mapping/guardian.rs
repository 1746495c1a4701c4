//! Guardian mapper. Guardians exist in the directory as mail contacts,
//! so the directory side is attribute-poor compared to user objects.

use crate::model::source::{attrs, columns, DirectoryAttrs, RelationalRow};
use crate::model::{GuardianRecord, PersonBase};

use super::{directory_true, normalize_phone, student::join_name};

/// Build a guardian record from a catalog row alone.
pub fn from_relational(row: Option<&RelationalRow>) -> Option<GuardianRecord> {
    let row = row?;

    let surname = row.get_or_empty(columns::GUA_SURNAME).to_string();
    let given_name = row.get_or_empty(columns::GUA_GIVEN_NAME).to_string();

    Some(GuardianRecord {
        base: PersonBase {
            internal_id: row.get_or_empty(columns::GUA_ID).to_string(),
            display_name: join_name(&surname, &given_name),
            surname,
            given_name,
            email: row.get_or_empty(columns::GUA_MAIL).to_string(),
            dn: String::new(),
            paired: false,
            partial: true,
        },
        phone: row
            .get(columns::GUA_PHONE)
            .map(normalize_phone)
            .unwrap_or_default(),
        gal_hidden: false,
        require_auth: false,
        distribution_lists: Vec::new(),
    })
}

/// Build a guardian record from a directory contact alone.
pub fn from_directory(object: Option<&DirectoryAttrs>) -> Option<GuardianRecord> {
    let object = object?;

    Some(GuardianRecord {
        base: PersonBase {
            internal_id: object.first_or_empty(attrs::EXT_INTERNAL_ID).to_string(),
            surname: object.first_or_empty(attrs::SURNAME).to_string(),
            given_name: object.first_or_empty(attrs::GIVEN_NAME).to_string(),
            display_name: object.first_or_empty(attrs::DISPLAY_NAME).to_string(),
            email: object.first_or_empty(attrs::MAIL).to_string(),
            dn: object.first_or_empty(attrs::DN).to_string(),
            paired: false,
            partial: true,
        },
        phone: object.first_or_empty(attrs::MOBILE).to_string(),
        gal_hidden: directory_true(object.first(attrs::GAL_HIDDEN)),
        require_auth: directory_true(object.first(attrs::REQUIRE_AUTH)),
        distribution_lists: object.all(attrs::MEMBER_OF).to_vec(),
    })
}

/// Reconcile both sources. Catalog contact data is authoritative when
/// present; email and phone fall back to the directory when the catalog
/// field is blank. The address-list flags and distribution lists only
/// exist on the directory side.
pub fn merge(
    row: Option<&RelationalRow>,
    object: Option<&DirectoryAttrs>,
) -> Option<GuardianRecord> {
    let (row, object) = match (row, object) {
        (None, None) => return None,
        (Some(row), None) => return from_relational(Some(row)),
        (None, Some(object)) => return from_directory(Some(object)),
        (Some(row), Some(object)) => (row, object),
    };

    let mut record = from_relational(Some(row))?;
    let technical = from_directory(Some(object))?;

    record.base.dn = technical.base.dn;
    if record.base.email.is_empty() {
        record.base.email = technical.base.email;
    }
    if record.phone.is_empty() {
        record.phone = technical.phone;
    }

    record.gal_hidden = technical.gal_hidden;
    record.require_auth = technical.require_auth;
    record.distribution_lists = technical.distribution_lists;

    record.base.partial = false;
    record.base.paired = true;
    Some(record)
}

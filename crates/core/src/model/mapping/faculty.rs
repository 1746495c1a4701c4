//! Faculty mapper.

use crate::model::source::{attrs, columns, DirectoryAttrs, RelationalRow};
use crate::model::{FacultyRecord, PersonBase};

use super::{relational_true, student::join_name};

/// Build a faculty record from a catalog row alone.
pub fn from_relational(row: Option<&RelationalRow>) -> Option<FacultyRecord> {
    let row = row?;

    let surname = row.get_or_empty(columns::FAC_SURNAME).to_string();
    let given_name = row.get_or_empty(columns::FAC_GIVEN_NAME).to_string();

    let class_teacher_of = row
        .get(columns::FAC_CLASS_TEACHER)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    Some(FacultyRecord {
        base: PersonBase {
            internal_id: row.get_or_empty(columns::FAC_ID).to_string(),
            display_name: join_name(&surname, &given_name),
            surname,
            given_name,
            email: row.get_or_empty(columns::FAC_MAIL).to_string(),
            dn: String::new(),
            paired: false,
            partial: true,
        },
        class_teacher_of,
        active_this_year: relational_true(row.get(columns::FAC_ACTIVE)),
    })
}

/// Build a faculty record from a directory object alone.
pub fn from_directory(object: Option<&DirectoryAttrs>) -> Option<FacultyRecord> {
    let object = object?;

    Some(FacultyRecord {
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
        class_teacher_of: None,
        active_this_year: false,
    })
}

/// Reconcile both sources. The catalog carries everything of substance
/// for faculty; only the distinguished name and the email fallback come
/// from the directory.
pub fn merge(
    row: Option<&RelationalRow>,
    object: Option<&DirectoryAttrs>,
) -> Option<FacultyRecord> {
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

    record.base.partial = false;
    record.base.paired = true;
    Some(record)
}

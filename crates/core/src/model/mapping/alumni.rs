//! Alumni mapper. Former students are kept in a per-school-year
//! organizational unit (`OU=ABS_2019_2020`); the graduation year is the
//! closing year of that span.

use crate::model::source::{attrs, columns, DirectoryAttrs, RelationalRow};
use crate::model::{AlumniRecord, PersonBase};

use super::{parse_numeric_or_zero, student::join_name};

/// Build an alumni record from a catalog row alone.
pub fn from_relational(row: Option<&RelationalRow>) -> Option<AlumniRecord> {
    let row = row?;

    let surname = row.get_or_empty(columns::STU_SURNAME).to_string();
    let given_name = row.get_or_empty(columns::STU_GIVEN_NAME).to_string();

    Some(AlumniRecord {
        base: PersonBase {
            internal_id: row.get_or_empty(columns::STU_ID).to_string(),
            display_name: join_name(&surname, &given_name),
            surname,
            given_name,
            email: row.get_or_empty(columns::STU_MAIL).to_string(),
            dn: String::new(),
            paired: false,
            partial: true,
        },
        graduation_year: parse_numeric_or_zero(
            row.get(columns::ALU_GRADUATED),
            columns::ALU_GRADUATED,
        ),
    })
}

/// Build an alumni record from a directory object alone.
pub fn from_directory(object: Option<&DirectoryAttrs>) -> Option<AlumniRecord> {
    let object = object?;

    let dn = object.first_or_empty(attrs::DN).to_string();
    let graduation_year = graduation_year_from_dn(&dn).unwrap_or(0);

    Some(AlumniRecord {
        base: PersonBase {
            internal_id: object.first_or_empty(attrs::EXT_INTERNAL_ID).to_string(),
            surname: object.first_or_empty(attrs::SURNAME).to_string(),
            given_name: object.first_or_empty(attrs::GIVEN_NAME).to_string(),
            display_name: object.first_or_empty(attrs::DISPLAY_NAME).to_string(),
            email: object.first_or_empty(attrs::MAIL).to_string(),
            dn,
            paired: false,
            partial: true,
        },
        graduation_year,
    })
}

/// Reconcile both sources. Only the distinguished name, the email
/// fallback and the directory-derived graduation year come from the
/// directory side.
pub fn merge(
    row: Option<&RelationalRow>,
    object: Option<&DirectoryAttrs>,
) -> Option<AlumniRecord> {
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
    if record.graduation_year == 0 {
        record.graduation_year = technical.graduation_year;
    }

    record.base.partial = false;
    record.base.paired = true;
    Some(record)
}

/// Parse the closing year out of an `OU=ABS_2019_2020` DN component.
pub fn graduation_year_from_dn(dn: &str) -> Option<u16> {
    for component in dn.split(',') {
        if let Some(span) = component.trim().strip_prefix("OU=ABS_") {
            let closing = span.split('_').nth(1)?;
            return closing.parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graduation_year_from_dn() {
        let dn = "CN=Stará Jana,OU=ABS_2019_2020,OU=Absolventi,DC=zs,DC=local";
        assert_eq!(graduation_year_from_dn(dn), Some(2020));
        assert_eq!(graduation_year_from_dn("CN=X,OU=Zaci,DC=zs,DC=local"), None);
        assert_eq!(
            graduation_year_from_dn("CN=X,OU=ABS_badspan,DC=zs,DC=local"),
            None
        );
    }

    #[test]
    fn test_from_directory() {
        let mut object = DirectoryAttrs::new();
        object
            .set(
                attrs::DN,
                "CN=Stará Jana,OU=ABS_2019_2020,OU=Absolventi,DC=zs,DC=local",
            )
            .set(attrs::SURNAME, "Stará")
            .set(attrs::GIVEN_NAME, "Jana")
            .set(attrs::EXT_INTERNAL_ID, "S0900");

        let record = from_directory(Some(&object)).unwrap();
        assert_eq!(record.graduation_year, 2020);
        assert_eq!(record.base.internal_id, "S0900");
        assert!(record.base.partial);
    }

    #[test]
    fn test_merge_year_fallback() {
        let row: RelationalRow = [
            (columns::STU_ID, "S0900"),
            (columns::STU_SURNAME, "Stará"),
            (columns::STU_GIVEN_NAME, "Jana"),
            (columns::ALU_GRADUATED, ""),
        ]
        .into_iter()
        .collect();

        let mut object = DirectoryAttrs::new();
        object.set(
            attrs::DN,
            "CN=Stará Jana,OU=ABS_2019_2020,OU=Absolventi,DC=zs,DC=local",
        );

        let record = merge(Some(&row), Some(&object)).unwrap();
        assert!(record.base.paired);
        assert_eq!(record.graduation_year, 2020);
    }
}

//! Student mapper.

use std::collections::BTreeMap;

use crate::model::source::{attrs, columns, DirectoryAttrs, RelationalRow};
use crate::model::{PersonBase, StudentRecord};

use super::{class_from_dn, directory_true, parse_class_year, parse_filetime, parse_numeric_or_zero};

/// Build a student record from a catalog row alone.
pub fn from_relational(row: Option<&RelationalRow>) -> Option<StudentRecord> {
    let row = row?;

    let surname = row.get_or_empty(columns::STU_SURNAME).to_string();
    let given_name = row.get_or_empty(columns::STU_GIVEN_NAME).to_string();

    let guardian_surname = row.get_or_empty(columns::GUA_SURNAME);
    let guardian_given = row.get_or_empty(columns::GUA_GIVEN_NAME);

    Some(StudentRecord {
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
        class_label: row.get_or_empty(columns::STU_CLASS).to_string(),
        class_year: parse_class_year(row.get(columns::STU_CLASS_YEAR), columns::STU_CLASS_YEAR),
        class_letter: row.get_or_empty(columns::STU_CLASS_LETTER).to_string(),
        class_number: row.get_or_empty(columns::STU_CLASS_NUMBER).to_string(),
        guardian_id: row.get_or_empty(columns::GUA_ID).to_string(),
        guardian_name: join_name(guardian_surname, guardian_given),
        guardian_phone: row
            .get(columns::GUA_PHONE)
            .map(super::normalize_phone)
            .unwrap_or_default(),
        guardian_email: row.get_or_empty(columns::GUA_MAIL).to_string(),
        expires: row.get_or_empty(columns::STU_EXPIRES).to_string(),
        ..Default::default()
    })
}

/// Build a student record from a directory object alone.
///
/// Class year/letter/label are derived from the distinguished name when it
/// carries the expected organizational-unit markers. The rule-eligible
/// attribute snapshot covers `extensionAttribute3`–`15` plus `title`,
/// recording every attribute present and non-empty.
pub fn from_directory(object: Option<&DirectoryAttrs>) -> Option<StudentRecord> {
    let object = object?;

    let dn = object.first_or_empty(attrs::DN).to_string();
    let (class_year, class_letter, class_label) =
        class_from_dn(&dn).unwrap_or((0, String::new(), String::new()));

    let mut rule_attributes = BTreeMap::new();
    for name in attrs::RULE_ELIGIBLE_EXT
        .iter()
        .copied()
        .chain(std::iter::once(attrs::TITLE))
    {
        if let Some(value) = object.first(name) {
            if !value.is_empty() {
                rule_attributes.insert(name.to_string(), value.to_string());
            }
        }
    }

    Some(StudentRecord {
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
        class_label,
        class_year,
        class_letter,
        class_number: String::new(),
        principal_name: object.first_or_empty(attrs::PRINCIPAL_NAME).to_string(),
        logon_name: object.first_or_empty(attrs::LOGON_NAME).to_string(),
        account_control: parse_numeric_or_zero(
            object.first(attrs::ACCOUNT_CONTROL),
            attrs::ACCOUNT_CONTROL,
        ),
        title: object.first_or_empty(attrs::TITLE).to_string(),
        ext_mail_restricted: directory_true(object.first(attrs::EXT_MAIL_RESTRICTED)),
        rule_attributes,
        proxy_addresses: object.all(attrs::PROXY_ADDRESSES).to_vec(),
        last_logon: parse_filetime(object.first(attrs::LAST_LOGON), attrs::LAST_LOGON),
        password_last_set: parse_filetime(object.first(attrs::PWD_LAST_SET), attrs::PWD_LAST_SET),
        groups: object.all(attrs::MEMBER_OF).to_vec(),
        ..Default::default()
    })
}

/// Reconcile both sources into one record.
///
/// The catalog wins on identity, class assignment and contact data; the
/// directory contributes technical account state. A blank catalog email
/// falls back to the directory value.
pub fn merge(
    row: Option<&RelationalRow>,
    object: Option<&DirectoryAttrs>,
) -> Option<StudentRecord> {
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

    record.principal_name = technical.principal_name;
    record.logon_name = technical.logon_name;
    record.account_control = technical.account_control;
    record.title = technical.title;
    record.ext_mail_restricted = technical.ext_mail_restricted;
    record.rule_attributes = technical.rule_attributes;
    record.proxy_addresses = technical.proxy_addresses;
    record.last_logon = technical.last_logon;
    record.password_last_set = technical.password_last_set;
    record.groups = technical.groups;

    record.base.partial = false;
    record.base.paired = true;
    Some(record)
}

/// Display name convention, surname first.
pub(crate) fn join_name(surname: &str, given_name: &str) -> String {
    match (surname.is_empty(), given_name.is_empty()) {
        (true, true) => String::new(),
        (false, true) => surname.to_string(),
        (true, false) => given_name.to_string(),
        (false, false) => format!("{} {}", surname, given_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_row() -> RelationalRow {
        [
            (columns::STU_ID, "S1234"),
            (columns::STU_SURNAME, "Novák"),
            (columns::STU_GIVEN_NAME, "Jan"),
            (columns::STU_CLASS, "5.A"),
            (columns::STU_CLASS_YEAR, "5"),
            (columns::STU_CLASS_LETTER, "A"),
            (columns::STU_CLASS_NUMBER, "17"),
            (columns::STU_MAIL, "jan@home.example"),
            (columns::STU_EXPIRES, ""),
            (columns::GUA_ID, "G0042"),
            (columns::GUA_SURNAME, "Nováková"),
            (columns::GUA_GIVEN_NAME, "Eva"),
            (columns::GUA_PHONE, "+420 777 123 456"),
            (columns::GUA_MAIL, "eva@home.example"),
        ]
        .into_iter()
        .collect()
    }

    fn directory_object() -> DirectoryAttrs {
        let mut object = DirectoryAttrs::new();
        object
            .set(
                attrs::DN,
                "CN=Novák Jan,OU=Trida-A,OU=Rocnik-5,OU=Zaci,DC=zs,DC=local",
            )
            .set(attrs::SURNAME, "Novák")
            .set(attrs::GIVEN_NAME, "Jan")
            .set(attrs::DISPLAY_NAME, "Novák Jan")
            .set(attrs::MAIL, "novak.jan@school.example")
            .set(attrs::LOGON_NAME, "novak.jan")
            .set(attrs::PRINCIPAL_NAME, "novak.jan@school.example")
            .set(attrs::ACCOUNT_CONTROL, "66048")
            .set(attrs::TITLE, "Žák")
            .set(attrs::EXT_INTERNAL_ID, "S1234")
            .set(attrs::EXT_MAIL_RESTRICTED, "TRUE")
            .set("extensionAttribute5", "chess-club");
        object.set_all(
            attrs::PROXY_ADDRESSES,
            ["SMTP:novak.jan@school.example"],
        );
        object.set_all(attrs::MEMBER_OF, ["CN=Zaci,OU=Skupiny,DC=zs,DC=local"]);
        object
    }

    #[test]
    fn test_from_relational() {
        let record = from_relational(Some(&catalog_row())).unwrap();
        assert_eq!(record.base.internal_id, "S1234");
        assert_eq!(record.base.display_name, "Novák Jan");
        assert_eq!(record.class_label, "5.A");
        assert_eq!(record.class_year, 5);
        assert_eq!(record.class_number, "17");
        assert_eq!(record.guardian_name, "Nováková Eva");
        assert_eq!(record.guardian_phone, "+420777123456");
        assert!(record.base.partial);
        assert!(!record.base.paired);
        assert!(record.base.pairing_consistent());
        // unparseable class year falls back to zero
        let mut row = catalog_row();
        row.set(columns::STU_CLASS_YEAR, "pátá");
        assert_eq!(from_relational(Some(&row)).unwrap().class_year, 0);
        // a year outside 1-9 is treated the same way
        row.set(columns::STU_CLASS_YEAR, "12");
        assert_eq!(from_relational(Some(&row)).unwrap().class_year, 0);
    }

    #[test]
    fn test_from_directory() {
        let record = from_directory(Some(&directory_object())).unwrap();
        assert_eq!(record.base.internal_id, "S1234");
        assert_eq!(record.class_year, 5);
        assert_eq!(record.class_letter, "A");
        assert_eq!(record.class_label, "5.A");
        assert_eq!(record.logon_name, "novak.jan");
        assert_eq!(record.account_control, 66048);
        assert!(record.ext_mail_restricted);
        assert!(record.base.partial);
        assert!(!record.base.paired);
    }

    #[test]
    fn test_rule_attribute_snapshot() {
        let record = from_directory(Some(&directory_object())).unwrap();
        // title and the one assigned extended attribute, nothing else
        assert_eq!(record.rule_attributes.len(), 2);
        assert_eq!(
            record.rule_attributes.get("extensionAttribute5").map(String::as_str),
            Some("chess-club")
        );
        assert_eq!(
            record.rule_attributes.get(attrs::TITLE).map(String::as_str),
            Some("Žák")
        );
        // the pairing and mail-restriction attributes are never captured
        assert!(!record.rule_attributes.contains_key(attrs::EXT_INTERNAL_ID));
        assert!(!record.rule_attributes.contains_key(attrs::EXT_MAIL_RESTRICTED));
    }

    #[test]
    fn test_merge_absent_sides() {
        assert!(merge(None, None).is_none());

        let row = catalog_row();
        let record = merge(Some(&row), None).unwrap();
        assert!(record.base.partial);
        assert!(!record.base.paired);

        let object = directory_object();
        let record = merge(None, Some(&object)).unwrap();
        assert!(record.base.partial);
        assert!(!record.base.paired);
    }

    #[test]
    fn test_merge_precedence() {
        let row = catalog_row();
        let object = directory_object();
        let record = merge(Some(&row), Some(&object)).unwrap();

        assert!(record.base.paired);
        assert!(!record.base.partial);

        // catalog side wins on identity and contact
        assert_eq!(record.base.internal_id, "S1234");
        assert_eq!(record.base.email, "jan@home.example");
        assert_eq!(record.class_number, "17");
        assert_eq!(record.guardian_email, "eva@home.example");

        // directory side wins on technical state
        assert!(record.base.dn.starts_with("CN=Novák Jan"));
        assert_eq!(record.logon_name, "novak.jan");
        assert_eq!(record.principal_name, "novak.jan@school.example");
        assert_eq!(record.account_control, 66048);
        assert_eq!(record.title, "Žák");
        assert!(record.ext_mail_restricted);
        assert_eq!(record.proxy_addresses.len(), 1);
        assert_eq!(record.groups.len(), 1);
    }

    #[test]
    fn test_merge_email_fallback() {
        let mut row = catalog_row();
        row.set(columns::STU_MAIL, "");
        let object = directory_object();
        let record = merge(Some(&row), Some(&object)).unwrap();
        assert_eq!(record.base.email, "novak.jan@school.example");
    }
}

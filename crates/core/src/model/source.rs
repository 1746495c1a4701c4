//! Raw source-data wrappers and field catalogs.
//!
//! The mappers treat both backing systems as opaque key/value lookups: the
//! relational catalog yields named string fields, the directory yields
//! named string or string-list attributes. The connectors that actually
//! fill these maps live outside the core.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Relational rows
// ---------------------------------------------------------------------------

/// One row from the school catalog, keyed by column (or join alias) name.
#[derive(Debug, Clone, Default)]
pub struct RelationalRow {
    fields: HashMap<String, String>,
}

impl RelationalRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field value, or `None` when the column is absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Field value with absent and empty collapsed to `""`.
    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.insert(column.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RelationalRow {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Directory attributes
// ---------------------------------------------------------------------------

/// One directory object's attributes. Multi-valued attributes (proxy
/// addresses, group membership) keep all values; `first` is the common
/// accessor for single-valued ones.
#[derive(Debug, Clone, Default)]
pub struct DirectoryAttrs {
    attrs: HashMap<String, Vec<String>>,
}

impl DirectoryAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value of the attribute, or `None` when absent or empty.
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.attrs
            .get(attribute)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// All values of the attribute (empty slice when absent).
    pub fn all(&self, attribute: &str) -> &[String] {
        self.attrs.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value with absent collapsed to `""`.
    pub fn first_or_empty(&self, attribute: &str) -> &str {
        self.first(attribute).unwrap_or("")
    }

    pub fn set(&mut self, attribute: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attrs.insert(attribute.into(), vec![value.into()]);
        self
    }

    pub fn set_all(
        &mut self,
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> &mut Self {
        self.attrs.insert(
            attribute.into(),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DirectoryAttrs {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            attrs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), vec![v.into()]))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Relational column catalog
// ---------------------------------------------------------------------------

/// Column and join-alias names used by the catalog queries.
pub mod columns {
    // students
    pub const STU_ID: &str = "INTERN_KOD";
    pub const STU_SURNAME: &str = "PRIJMENI";
    pub const STU_GIVEN_NAME: &str = "JMENO";
    pub const STU_CLASS: &str = "TRIDA";
    pub const STU_CLASS_NUMBER: &str = "C_TR_VYK";
    pub const STU_MAIL: &str = "E_MAIL";
    pub const STU_EXPIRES: &str = "EVID_DO";
    /// Class-year digit, selected out of `TRIDA` by the query.
    pub const STU_CLASS_YEAR: &str = "B_ROCNIK";
    /// Class-letter, selected out of `TRIDA` by the query.
    pub const STU_CLASS_LETTER: &str = "B_TRIDA";

    // guardian join aliases on the student query, and the guardian query
    pub const GUA_ID: &str = "ZZ_KOD";
    pub const GUA_SURNAME: &str = "ZZ_PRIJMENI";
    pub const GUA_GIVEN_NAME: &str = "ZZ_JMENO";
    pub const GUA_PHONE: &str = "ZZ_TELEFON";
    pub const GUA_MAIL: &str = "ZZ_MAIL";

    // faculty
    pub const FAC_ID: &str = "INTERN_KOD";
    pub const FAC_SURNAME: &str = "PRIJMENI";
    pub const FAC_GIVEN_NAME: &str = "JMENO";
    pub const FAC_MAIL: &str = "E_MAIL";
    pub const FAC_ACTIVE: &str = "AKTIVNI";
    pub const FAC_CLASS_TEACHER: &str = "TRIDNICTVI";

    // alumni
    pub const ALU_GRADUATED: &str = "ABS_ROK";

    /// Truth literal used by the catalog's flag columns.
    pub const LIT_TRUE: &str = "1";
}

// ---------------------------------------------------------------------------
// Directory attribute catalog
// ---------------------------------------------------------------------------

/// Directory attribute names used by the mappers.
pub mod attrs {
    pub const DN: &str = "distinguishedName";
    pub const SURNAME: &str = "sn";
    pub const GIVEN_NAME: &str = "givenName";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const MAIL: &str = "mail";
    pub const MOBILE: &str = "mobile";
    pub const TITLE: &str = "title";
    pub const LOGON_NAME: &str = "sAMAccountName";
    pub const PRINCIPAL_NAME: &str = "userPrincipalName";
    pub const ACCOUNT_CONTROL: &str = "userAccountControl";
    pub const PROXY_ADDRESSES: &str = "proxyAddresses";
    pub const MEMBER_OF: &str = "memberOf";
    pub const LAST_LOGON: &str = "lastLogon";
    pub const PWD_LAST_SET: &str = "pwdLastSet";
    pub const GAL_HIDDEN: &str = "msExchHideFromAddressLists";
    pub const REQUIRE_AUTH: &str = "msExchRequireAuthToSendTo";

    /// Internal-id tag, managed by the pairing phase. Never touched by
    /// the rule engine.
    pub const EXT_INTERNAL_ID: &str = "extensionAttribute1";
    /// External-mail restriction flag, managed by the mail phase. Never
    /// touched by the rule engine.
    pub const EXT_MAIL_RESTRICTED: &str = "extensionAttribute2";

    /// Truth literal used by directory boolean attributes.
    pub const LIT_TRUE: &str = "TRUE";

    /// The closed set of rule-eligible extended attributes
    /// (`extensionAttribute3`–`15`). `title` is rule-eligible as well but
    /// lives in its own standard attribute.
    pub const RULE_ELIGIBLE_EXT: [&str; 13] = [
        "extensionAttribute3",
        "extensionAttribute4",
        "extensionAttribute5",
        "extensionAttribute6",
        "extensionAttribute7",
        "extensionAttribute8",
        "extensionAttribute9",
        "extensionAttribute10",
        "extensionAttribute11",
        "extensionAttribute12",
        "extensionAttribute13",
        "extensionAttribute14",
        "extensionAttribute15",
    ];
}

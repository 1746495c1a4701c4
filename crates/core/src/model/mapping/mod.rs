//! Per-role mappers for building identity records from raw source data.
//!
//! Each role module exposes the same three pure operations:
//!
//! - `from_relational(row)`: record from the catalog side only
//! - `from_directory(object)`: record from the directory side only
//! - `merge(row, object)`: the reconciled view of both
//!
//! The catalog is the system of record for identity, class assignment and
//! primary contact data; the directory is authoritative only for technical
//! account state. `merge` therefore starts from the relational record and
//! overlays directory-only fields, falling back to the directory for
//! contact fields the catalog left blank.
//!
//! These mappers are the only place `paired`/`partial` are ever set.

pub mod alumni;
pub mod faculty;
pub mod guardian;
pub mod student;

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

/// Seconds between the directory filetime epoch (1601-01-01) and the Unix
/// epoch.
const FILETIME_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// Parse a numeric field, defaulting to zero.
///
/// Zero-by-default is indistinguishable from an explicit zero for callers;
/// every unparseable value is logged with the raw input so the operator
/// can find bad catalog data.
pub(crate) fn parse_numeric_or_zero<T>(raw: Option<&str>, field: &'static str) -> T
where
    T: std::str::FromStr + Default,
{
    match raw {
        None => T::default(),
        Some(v) if v.trim().is_empty() => T::default(),
        Some(v) => v.trim().parse::<T>().unwrap_or_else(|_| {
            warn!(field, raw = v, "numeric field failed to parse, using zero");
            T::default()
        }),
    }
}

/// Parse a class-year field. The school runs years 1 through 9; anything
/// outside that range is logged and treated like an unparseable value
/// (zero means unknown).
pub(crate) fn parse_class_year(raw: Option<&str>, field: &'static str) -> u8 {
    let year: u8 = parse_numeric_or_zero(raw, field);
    if year > 9 {
        warn!(field, year, "class year out of range, using zero");
        return 0;
    }
    year
}

/// Parse a directory filetime value (100-ns intervals since 1601-01-01).
///
/// Absent, zero and unparseable values all map to `None`; unparseable ones
/// are logged.
pub(crate) fn parse_filetime(raw: Option<&str>, field: &'static str) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let ticks = match raw.parse::<i64>() {
        Ok(t) => t,
        Err(_) => {
            warn!(field, raw, "timestamp attribute failed to parse");
            return None;
        }
    };
    // 0 / -1 are "never" markers
    if ticks <= 0 {
        return None;
    }

    let secs = ticks / 10_000_000 - FILETIME_EPOCH_OFFSET_SECS;
    let nanos = (ticks % 10_000_000) as u32 * 100;
    Utc.timestamp_opt(secs, nanos).single()
}

/// Directory boolean attributes carry the literal `TRUE` when set.
pub(crate) fn directory_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case(crate::model::source::attrs::LIT_TRUE))
}

/// Catalog flag columns carry the literal `1` when set.
pub(crate) fn relational_true(value: Option<&str>) -> bool {
    value == Some(crate::model::source::columns::LIT_TRUE)
}

/// Phone numbers from the catalog keep arbitrary spacing; normalize by
/// stripping spaces.
pub(crate) fn normalize_phone(raw: &str) -> String {
    raw.replace(' ', "").trim().to_string()
}

/// Derive (year, letter, label) from a student DN carrying the expected
/// organizational-unit markers, e.g.
/// `CN=Novák Jan,OU=Trida-E,OU=Rocnik-2,OU=Zaci,...` → `(2, "E", "2.E")`.
pub(crate) fn class_from_dn(dn: &str) -> Option<(u8, String, String)> {
    let mut letter: Option<&str> = None;
    let mut year: Option<&str> = None;

    for component in dn.split(',') {
        let component = component.trim();
        if let Some(rest) = component.strip_prefix("OU=Trida-") {
            letter.get_or_insert(rest);
        } else if let Some(rest) = component.strip_prefix("OU=Rocnik-") {
            year.get_or_insert(rest);
        }
    }

    let (letter, year_str) = (letter?, year?);
    let year: u8 = year_str.parse().ok().filter(|y| (1..=9).contains(y))?;
    let letter = letter.to_uppercase();
    let label = format!("{}.{}", year, letter);
    Some((year, letter, label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_or_zero() {
        assert_eq!(parse_numeric_or_zero::<u8>(Some("7"), "f"), 7);
        assert_eq!(parse_numeric_or_zero::<u8>(Some("  3 "), "f"), 3);
        assert_eq!(parse_numeric_or_zero::<u8>(Some("x"), "f"), 0);
        assert_eq!(parse_numeric_or_zero::<u8>(Some(""), "f"), 0);
        assert_eq!(parse_numeric_or_zero::<u8>(None, "f"), 0);
        assert_eq!(parse_numeric_or_zero::<u32>(Some("66048"), "f"), 66048);
    }

    #[test]
    fn test_parse_filetime() {
        // 2020-04-08 12:00:00 UTC = 1586347200 Unix seconds
        let ticks = (1_586_347_200i64 + FILETIME_EPOCH_OFFSET_SECS) * 10_000_000;
        let parsed = parse_filetime(Some(&ticks.to_string()), "lastLogon").unwrap();
        assert_eq!(parsed.timestamp(), 1_586_347_200);

        assert_eq!(parse_filetime(Some("0"), "lastLogon"), None);
        assert_eq!(parse_filetime(Some("garbage"), "lastLogon"), None);
        assert_eq!(parse_filetime(None, "lastLogon"), None);
    }

    #[test]
    fn test_boolean_literals() {
        assert!(directory_true(Some("TRUE")));
        assert!(directory_true(Some("true")));
        assert!(!directory_true(Some("FALSE")));
        assert!(!directory_true(None));

        assert!(relational_true(Some("1")));
        assert!(!relational_true(Some("0")));
        assert!(!relational_true(None));
    }

    #[test]
    fn test_class_from_dn() {
        let dn = "CN=Novák Jan,OU=Trida-E,OU=Rocnik-2,OU=Zaci,OU=Uzivatele,DC=zs,DC=local";
        assert_eq!(
            class_from_dn(dn),
            Some((2, "E".to_string(), "2.E".to_string()))
        );

        // lowercase letter is upcased in the label
        let dn = "CN=Malá Eva,OU=Trida-a,OU=Rocnik-9,OU=Zaci,DC=zs,DC=local";
        assert_eq!(
            class_from_dn(dn),
            Some((9, "A".to_string(), "9.A".to_string()))
        );

        // markers missing
        assert_eq!(class_from_dn("CN=Admin,OU=Sprava,DC=zs,DC=local"), None);
        // year not numeric
        assert_eq!(
            class_from_dn("CN=X,OU=Trida-B,OU=Rocnik-nope,DC=zs,DC=local"),
            None
        );
        // year outside 1-9
        assert_eq!(
            class_from_dn("CN=X,OU=Trida-B,OU=Rocnik-12,DC=zs,DC=local"),
            None
        );
    }

    #[test]
    fn test_parse_class_year_bounds() {
        assert_eq!(parse_class_year(Some("5"), "f"), 5);
        assert_eq!(parse_class_year(Some("9"), "f"), 9);
        assert_eq!(parse_class_year(Some("12"), "f"), 0);
        assert_eq!(parse_class_year(Some("255"), "f"), 0);
        assert_eq!(parse_class_year(Some("x"), "f"), 0);
        assert_eq!(parse_class_year(None, "f"), 0);
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+420 777 123 456"), "+420777123456");
        assert_eq!(normalize_phone("  777123456 "), "777123456");
    }
}

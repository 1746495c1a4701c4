//! Login and principal-name derivation.
//!
//! Pure functions that turn human names into deterministic, lowercase,
//! diacritic-free ASCII identifiers. Collision handling is the caller's
//! job: on a taken name it retries with the next attempt counter, which
//! these functions fold into the generated identifier.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Legacy directory short-name limit (pre-Windows 2000 logon names).
const MAX_LOGIN_LEN: usize = 20;

/// Derive a short logon name in the form `surname.givenname`, truncated to
/// the 20-character directory limit.
///
/// `attempt` 0 appends nothing; any other value is appended as decimal
/// digits, and the base is truncated to make room for them.
///
/// ```
/// use classkeeper_core::naming::login;
///
/// assert_eq!(login("Novák", "Jan", 0), "novak.jan");
/// assert_eq!(login("Novák", "Jan", 2), "novak.jan2");
/// ```
pub fn login(surname: &str, given_name: &str, attempt: u32) -> String {
    let base = login_base(surname, given_name);
    let digits = attempt_digits(attempt);

    let limit = MAX_LOGIN_LEN - digits.len();
    if base.chars().count() <= limit {
        format!("{}{}", base, digits)
    } else {
        let truncated: String = base.chars().take(limit).collect();
        format!("{}{}", truncated, digits)
    }
}

/// Derive a principal name (`surname.givenname[attempt]@domain`).
///
/// Unlike [`login`], the local part is not length-limited.
pub fn principal_name(surname: &str, given_name: &str, domain: &str, attempt: u32) -> String {
    format!(
        "{}{}@{}",
        login_base(surname, given_name),
        attempt_digits(attempt),
        domain
    )
}

/// Common `surname.givenname` base shared by both derivations.
fn login_base(surname: &str, given_name: &str) -> String {
    let sn_norm = merge_surname_particle(&normalize(surname));
    let sn = first_token(&sn_norm);
    let gn_norm = normalize(given_name);
    let gn = first_token(&gn_norm);
    format!(
        "{}.{}",
        strip_diacritics(sn).to_lowercase(),
        strip_diacritics(gn).to_lowercase()
    )
}

fn attempt_digits(attempt: u32) -> String {
    if attempt == 0 {
        String::new()
    } else {
        attempt.to_string()
    }
}

/// Replace hyphens with spaces and collapse whitespace runs to one space.
fn normalize(name: &str) -> String {
    name.replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Merge a leading surname particle ("Van Houten" → "VanHouten") so it is
/// not mistaken for a standalone first surname token.
///
/// The particle patterns are anchored at the start of the string and
/// applied at most once each: `[vV][ao]n `, `[dD][aei] `, `[aA]l `. The
/// leading letter keeps its case.
fn merge_surname_particle(surname: &str) -> String {
    let mut s = surname.to_string();

    let b = s.as_bytes();
    if b.len() > 4
        && (b[0] == b'v' || b[0] == b'V')
        && (b[1] == b'a' || b[1] == b'o')
        && b[2] == b'n'
        && b[3] == b' '
    {
        s.remove(3);
    }

    let b = s.as_bytes();
    if b.len() > 3
        && (b[0] == b'd' || b[0] == b'D')
        && matches!(b[1], b'a' | b'e' | b'i')
        && b[2] == b' '
    {
        s.remove(2);
    }

    let b = s.as_bytes();
    if b.len() > 3 && (b[0] == b'a' || b[0] == b'A') && b[1] == b'l' && b[2] == b' ' {
        s.remove(2);
    }

    s
}

fn first_token(name: &str) -> &str {
    name.split(' ').next().unwrap_or("")
}

/// Remove diacritics by decomposing to NFD and dropping combining marks
/// ("Novák" → "Novak").
fn strip_diacritics(name: &str) -> String {
    name.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        assert_eq!(login("Novák", "Jan", 0), "novak.jan");
        assert_eq!(login("Svobodová", "Kateřina", 0), "svobodova.katerina");
    }

    #[test]
    fn test_multi_word_names_take_first_token() {
        // "Svobodová Nováková Jana Kateřina" style entries
        assert_eq!(login("Svobodová Nováková", "Jana Kateřina", 0), "svobodova.jana");
    }

    #[test]
    fn test_surname_particles() {
        assert_eq!(login("Van Houten", "Milhouse", 0), "vanhouten.milhouse");
        assert_eq!(login("von Neumann", "John", 0), "vonneumann.john");
        assert_eq!(login("Da Vinci", "Leonardo", 0), "davinci.leonardo");
        assert_eq!(login("De Gaulle", "Charles", 0), "degaulle.charles");
        assert_eq!(login("Di Caprio", "Leonardo", 0), "dicaprio.leonardo");
        assert_eq!(login("Al Capone", "Alphonse", 0), "alcapone.alphonse");
    }

    #[test]
    fn test_hyphenated_surname_behaves_like_spaced() {
        assert_eq!(login("Da-Vinci", "Leonardo", 0), "davinci.leonardo");
        assert_eq!(
            login("Kočí-Nováková", "Marie", 0),
            login("Kočí Nováková", "Marie", 0)
        );
    }

    #[test]
    fn test_attempt_counter() {
        assert_eq!(login("Novák", "Jan", 1), "novak.jan1");
        assert_eq!(login("Novák", "Jan", 12), "novak.jan12");
    }

    #[test]
    fn test_truncation_makes_room_for_attempt_digits() {
        // base "schwarzwaldova.anastazie" is 24 chars; limit is 20 minus
        // one attempt digit
        assert_eq!(login("Schwarzwaldová", "Anastázie", 7), "schwarzwaldova.anas7");
        assert_eq!(login("Schwarzwaldová", "Anastázie", 0), "schwarzwaldova.anast");
        assert_eq!(login("Schwarzwaldová", "Anastázie", 10), "schwarzwaldova.ana10");
    }

    #[test]
    fn test_login_shape_invariants() {
        let cases = [
            ("Novák", "Jan"),
            ("Van Houten", "Milhouse"),
            ("Schwarzwaldová", "Anastázie"),
            ("Svobodová Nováková", "Jana Kateřina"),
            ("Dlouhopolská-Přemyslovská", "Maximiliána"),
        ];
        for (sn, gn) in cases {
            for attempt in [0u32, 1, 9, 42] {
                let l = login(sn, gn, attempt);
                assert!(l.len() <= 20, "too long: {}", l);
                assert!(l.is_ascii(), "not ascii: {}", l);
                assert_eq!(l.to_lowercase(), l, "not lowercase: {}", l);
                assert_eq!(l.matches('.').count(), 1, "dot count: {}", l);
            }
        }
    }

    #[test]
    fn test_principal_name() {
        assert_eq!(
            principal_name("Novák", "Jan", "school.example", 0),
            "novak.jan@school.example"
        );
        assert_eq!(
            principal_name("Novák", "Jan", "school.example", 3),
            "novak.jan3@school.example"
        );
        // no truncation in the local part
        assert_eq!(
            principal_name("Schwarzwaldová", "Anastázie", "school.example", 7),
            "schwarzwaldova.anastazie7@school.example"
        );
    }

    #[test]
    fn test_particle_requires_following_name() {
        // a surname that IS a particle word stays untouched
        assert_eq!(login("Van", "Petr", 0), "van.petr");
    }
}

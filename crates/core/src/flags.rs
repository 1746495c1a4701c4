//! Account-control flag algebra.
//!
//! A directory account's state is a 32-bit integer whose bits individually
//! enable or disable account capabilities. [`AccountFlag`] catalogs every
//! bit the directory service defines; only a handful (disable, password
//! expiry) are needed for student and faculty accounts, but the full set
//! is kept so raw values can always be decoded.

use crate::errors::FlagError;

/// Named bit values of the directory account-control integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AccountFlag {
    Script = 0x0001,
    /// The account is locked against logon.
    AccountDisable = 0x0002,
    HomedirRequired = 0x0008,
    Lockout = 0x0010,
    PasswdNotReqd = 0x0020,
    /// The user cannot change their own password.
    PasswdCantChange = 0x0040,
    EncryptedTextPwdAllowed = 0x0080,
    TempDuplicateAccount = 0x0100,
    NormalAccount = 0x0200,
    InterdomainTrustAccount = 0x0800,
    WorkstationTrustAccount = 0x1000,
    ServerTrustAccount = 0x2000,
    /// The password never expires.
    DontExpirePassword = 0x10000,
    MnsLogonAccount = 0x20000,
    SmartcardRequired = 0x40000,
    TrustedForDelegation = 0x80000,
    NotDelegated = 0x100000,
    UseDesKeyOnly = 0x200000,
    DontReqPreauth = 0x400000,
    /// The password has already expired.
    PasswordExpired = 0x800000,
    TrustedToAuthForDelegation = 0x1000000,
    PartialSecretsAccount = 0x04000000,
}

impl AccountFlag {
    /// Numeric value of the flag bit.
    pub const fn value(self) -> u32 {
        self as u32
    }

    /// All cataloged flags, in ascending bit order.
    pub const ALL: [AccountFlag; 22] = [
        AccountFlag::Script,
        AccountFlag::AccountDisable,
        AccountFlag::HomedirRequired,
        AccountFlag::Lockout,
        AccountFlag::PasswdNotReqd,
        AccountFlag::PasswdCantChange,
        AccountFlag::EncryptedTextPwdAllowed,
        AccountFlag::TempDuplicateAccount,
        AccountFlag::NormalAccount,
        AccountFlag::InterdomainTrustAccount,
        AccountFlag::WorkstationTrustAccount,
        AccountFlag::ServerTrustAccount,
        AccountFlag::DontExpirePassword,
        AccountFlag::MnsLogonAccount,
        AccountFlag::SmartcardRequired,
        AccountFlag::TrustedForDelegation,
        AccountFlag::NotDelegated,
        AccountFlag::UseDesKeyOnly,
        AccountFlag::DontReqPreauth,
        AccountFlag::PasswordExpired,
        AccountFlag::TrustedToAuthForDelegation,
        AccountFlag::PartialSecretsAccount,
    ];

    /// Short display name for decoding raw values.
    pub const fn name(self) -> &'static str {
        match self {
            AccountFlag::Script => "SCRIPT",
            AccountFlag::AccountDisable => "ACCOUNTDISABLE",
            AccountFlag::HomedirRequired => "HOMEDIR_REQUIRED",
            AccountFlag::Lockout => "LOCKOUT",
            AccountFlag::PasswdNotReqd => "PASSWD_NOTREQD",
            AccountFlag::PasswdCantChange => "PASSWD_CANT_CHANGE",
            AccountFlag::EncryptedTextPwdAllowed => "ENCRYPTED_TEXT_PWD_ALLOWED",
            AccountFlag::TempDuplicateAccount => "TEMP_DUPLICATE_ACCOUNT",
            AccountFlag::NormalAccount => "NORMAL_ACCOUNT",
            AccountFlag::InterdomainTrustAccount => "INTERDOMAIN_TRUST_ACCOUNT",
            AccountFlag::WorkstationTrustAccount => "WORKSTATION_TRUST_ACCOUNT",
            AccountFlag::ServerTrustAccount => "SERVER_TRUST_ACCOUNT",
            AccountFlag::DontExpirePassword => "DONT_EXPIRE_PASSWORD",
            AccountFlag::MnsLogonAccount => "MNS_LOGON_ACCOUNT",
            AccountFlag::SmartcardRequired => "SMARTCARD_REQUIRED",
            AccountFlag::TrustedForDelegation => "TRUSTED_FOR_DELEGATION",
            AccountFlag::NotDelegated => "NOT_DELEGATED",
            AccountFlag::UseDesKeyOnly => "USE_DES_KEY_ONLY",
            AccountFlag::DontReqPreauth => "DONT_REQ_PREAUTH",
            AccountFlag::PasswordExpired => "PASSWORD_EXPIRED",
            AccountFlag::TrustedToAuthForDelegation => "TRUSTED_TO_AUTH_FOR_DELEGATION",
            AccountFlag::PartialSecretsAccount => "PARTIAL_SECRETS_ACCOUNT",
        }
    }
}

/// Check whether `flag` is present in `state`.
pub const fn has_flag(state: u32, flag: AccountFlag) -> bool {
    (state & flag.value()) != 0
}

/// Return `state` with `flag` set. Idempotent.
pub const fn with_flag(state: u32, flag: AccountFlag) -> u32 {
    state | flag.value()
}

/// Return `state` with `flag` cleared. Idempotent.
pub const fn without_flag(state: u32, flag: AccountFlag) -> u32 {
    state & !flag.value()
}

/// Parse a string-typed account-control value.
///
/// Directory attribute values arrive as decimal strings; a malformed value
/// is a caller error and propagates, unlike the zero-defaulting numeric
/// fields in the mappers.
pub fn parse_state(raw: &str) -> Result<u32, FlagError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| FlagError::Malformed(raw.to_string()))
}

/// String-typed overload of [`has_flag`].
pub fn has_flag_str(state: &str, flag: AccountFlag) -> Result<bool, FlagError> {
    Ok(has_flag(parse_state(state)?, flag))
}

/// String-typed overload of [`with_flag`].
pub fn with_flag_str(state: &str, flag: AccountFlag) -> Result<u32, FlagError> {
    Ok(with_flag(parse_state(state)?, flag))
}

/// String-typed overload of [`without_flag`].
pub fn without_flag_str(state: &str, flag: AccountFlag) -> Result<u32, FlagError> {
    Ok(without_flag(parse_state(state)?, flag))
}

/// Decode a raw state into the list of set flags.
pub fn decode(state: u32) -> Vec<AccountFlag> {
    AccountFlag::ALL
        .iter()
        .copied()
        .filter(|f| has_flag(state, *f))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_flag() {
        // 0x0202 = NORMAL_ACCOUNT | ACCOUNTDISABLE
        assert!(has_flag(0x0202, AccountFlag::AccountDisable));
        assert!(has_flag(0x0202, AccountFlag::NormalAccount));
        assert!(!has_flag(0x0200, AccountFlag::AccountDisable));
    }

    #[test]
    fn test_with_flag_idempotent() {
        let x = 0x0200;
        let once = with_flag(x, AccountFlag::AccountDisable);
        let twice = with_flag(once, AccountFlag::AccountDisable);
        assert_eq!(once, twice);
        assert_eq!(once, 0x0202);
    }

    #[test]
    fn test_without_flag_idempotent() {
        let x = 0x0202;
        let once = without_flag(x, AccountFlag::AccountDisable);
        let twice = without_flag(once, AccountFlag::AccountDisable);
        assert_eq!(once, twice);
        assert_eq!(once, 0x0200);
    }

    #[test]
    fn test_set_then_clear_equals_clear() {
        for x in [0u32, 0x0200, 0x0202, 0x10202, u32::MAX] {
            let set_clear =
                without_flag(with_flag(x, AccountFlag::AccountDisable), AccountFlag::AccountDisable);
            let clear_only = without_flag(x, AccountFlag::AccountDisable);
            assert_eq!(set_clear, clear_only);
        }
    }

    #[test]
    fn test_string_overloads() {
        assert!(has_flag_str("514", AccountFlag::AccountDisable).unwrap());
        assert_eq!(with_flag_str("512", AccountFlag::AccountDisable).unwrap(), 514);
        assert_eq!(without_flag_str("514", AccountFlag::AccountDisable).unwrap(), 512);
    }

    #[test]
    fn test_malformed_state_propagates() {
        let result = has_flag_str("not-a-number", AccountFlag::AccountDisable);
        assert!(matches!(result, Err(FlagError::Malformed(_))));
    }

    #[test]
    fn test_decode() {
        let flags = decode(0x10202);
        assert!(flags.contains(&AccountFlag::NormalAccount));
        assert!(flags.contains(&AccountFlag::AccountDisable));
        assert!(flags.contains(&AccountFlag::DontExpirePassword));
        assert_eq!(flags.len(), 3);
    }
}

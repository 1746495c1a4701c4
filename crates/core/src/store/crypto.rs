//! Symmetric sealing of the history database file.
//!
//! Layout of a sealed blob: `salt (16) || nonce (12) || ciphertext+tag`.
//! The key is derived from the operator passphrase with PBKDF2-HMAC-SHA256
//! at 65536 iterations, matching the key schedule the stored files were
//! originally written with.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::RngCore;
use sha2::Sha256;

use crate::errors::StoreError;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const PBKDF2_ITERATIONS: u32 = 65_536;

fn derive_key(passphrase: &str, salt: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2::<Hmac<Sha256>>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Encrypt `plaintext` under `passphrase` with a fresh salt and nonce.
pub fn seal(passphrase: &str, plaintext: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let key = derive_key(passphrase, &salt);
    let cipher = Aes256Gcm::new(&key.into());
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| StoreError::Encryption(format!("seal failed: {e:?}")))?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a blob produced by [`seal`]. Fails on truncated input, a wrong
/// passphrase or any tampering (the GCM tag covers both).
pub fn open(passphrase: &str, blob: &[u8]) -> Result<Vec<u8>, StoreError> {
    if blob.len() < SALT_LEN + NONCE_LEN {
        return Err(StoreError::Encryption(format!(
            "sealed blob too short ({} bytes)",
            blob.len()
        )));
    }

    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let key = derive_key(passphrase, salt);
    let cipher = Aes256Gcm::new(&key.into());
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| StoreError::Encryption("decryption failed, likely a wrong passphrase".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_round_trip() {
        let blob = seal("hunter2", b"history payload").unwrap();
        assert_eq!(open("hunter2", &blob).unwrap(), b"history payload");
    }

    #[test]
    fn test_fresh_salt_and_nonce_per_seal() {
        let a = seal("hunter2", b"same input").unwrap();
        let b = seal("hunter2", b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_passphrase_rejected() {
        let blob = seal("hunter2", b"secret").unwrap();
        assert!(open("hunter3", &blob).is_err());
    }

    #[test]
    fn test_tampering_rejected() {
        let mut blob = seal("hunter2", b"secret").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert!(open("hunter2", &blob).is_err());
    }

    #[test]
    fn test_truncated_blob_rejected() {
        assert!(open("hunter2", &[0u8; 10]).is_err());
    }
}

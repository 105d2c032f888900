//! Decorative license-activation keys handed back with each generated app.
//!
//! Keys look like `XXXX-XXXX-XXXX-XXXX`: twelve characters drawn from a fixed
//! alphabet followed by a four-character checksum, the uppercase first four
//! hex digits of SHA-256 over those twelve. This is the same check the
//! `LicenseManager` in the generated app performs, so the keys unlock it.
//! It is a demo artifact, not a protection scheme.

use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// 32 symbols, no `I`, `O`, `0` or `1`.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const BODY_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseKey {
    pub id: usize,
    pub key: String,
}

fn checksum(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    format!("{:02X}{:02X}", digest[0], digest[1])
}

fn random_body() -> String {
    // Bytes 6 and 8 carry the UUID version and variant bits.
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 6 && *i != 8)
        .take(BODY_LEN)
        .map(|(_, b)| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect()
}

fn format_key(body: &str) -> String {
    let raw = format!("{}{}", body, checksum(body));
    raw.as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("-")
}

/// Generates `count` keys numbered from 1.
pub fn generate_license_keys(count: usize) -> Vec<LicenseKey> {
    (1..=count)
        .map(|id| LicenseKey {
            id,
            key: format_key(&random_body()),
        })
        .collect()
}

/// Mirrors the validation done by the generated app.
pub fn validate_license_key(key: &str) -> bool {
    let clean = key.replace('-', "").to_uppercase();
    if clean.len() != 16 || !clean.is_ascii() {
        return false;
    }
    let (body, check) = clean.split_at(BODY_LEN);
    checksum(body) == check
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! initData signature computation.
//!
//! This is the Telegram Mini-App validation scheme and must match it bit for bit:
//!
//! ```text
//! data_check_string = sorted("key=value" for every field except hash).join("\n")
//! secret_key        = HMAC_SHA256(key = "WebAppData", msg = bot_token)
//! hash              = hex(HMAC_SHA256(key = secret_key, msg = data_check_string))
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::init_data::HASH_FIELD;
use super::secret::SharedSecret;

type HmacSha256 = Hmac<Sha256>;

/// Fixed label used to derive the signing key from the bot token.
const WEB_APP_DATA_LABEL: &[u8] = b"WebAppData";

/// Build the canonical payload from the given fields.
///
/// Fields are sorted here regardless of input order, and `hash` is always
/// skipped.
pub fn data_check_string<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(&str, &str)> = fields
        .into_iter()
        .filter(|(key, _)| *key != HASH_FIELD)
        .collect();
    pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `HMAC_SHA256("WebAppData", bot_token)`
fn signing_key(secret: &SharedSecret) -> [u8; 32] {
    let mut mac = new_mac(WEB_APP_DATA_LABEL);
    mac.update(secret.expose());
    let mut key = [0u8; 32];
    key.copy_from_slice(&mac.finalize().into_bytes());
    key
}

/// Lower-case hex signature the issuer would have produced for `fields`.
pub fn expected_signature<'a, I>(fields: I, secret: &SharedSecret) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let payload = data_check_string(fields);
    let mut mac = new_mac(&signing_key(secret));
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Compare two signatures without leaking where they differ.
///
/// Different lengths are rejected up front; only equal-length inputs reach
/// the constant-time comparison.
pub fn signatures_match(expected: &str, claimed: &str) -> bool {
    if expected.len() != claimed.len() {
        return false;
    }
    expected.as_bytes().ct_eq(claimed.as_bytes()).into()
}

fn new_mac(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length")
}

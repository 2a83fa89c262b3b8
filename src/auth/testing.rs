// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reference initData signer for tests.
//!
//! Written directly against `hmac` so it does not share code with
//! `signature.rs`. Also captures log output for audit assertions.

use std::io;
use std::sync::{Arc, Mutex};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing_subscriber::fmt::MakeWriter;
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

pub(crate) const BOT_TOKEN: &str = "s3cr3t";

/// `hex(HMAC(HMAC("WebAppData", bot_token), sorted "k=v" lines))`
pub(crate) fn reference_hash(pairs: &[(&str, &str)], bot_token: &str) -> String {
    let mut sorted: Vec<_> = pairs.iter().filter(|(k, _)| *k != "hash").collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let payload = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut key_mac = HmacSha256::new_from_slice(b"WebAppData").unwrap();
    key_mac.update(bot_token.as_bytes());
    let key = key_mac.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(&key).unwrap();
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// URL-encode `pairs` in the given order, without a hash.
pub(crate) fn encode(pairs: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// URL-encoded initData with a valid `hash` appended.
pub(crate) fn signed_init_data(pairs: &[(&str, &str)], bot_token: &str) -> String {
    let hash = reference_hash(pairs, bot_token);
    let mut all: Vec<(&str, &str)> = pairs.to_vec();
    all.push(("hash", hash.as_str()));
    encode(&all)
}

/// Default field set: `auth_date`, `query_id` and a user with id 42.
pub(crate) fn sample_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("auth_date", "1700000000"),
        ("query_id", "AAHdF6IQAAAAAN0XohDhrOrc"),
        (
            "user",
            r#"{"id":42,"first_name":"Anna","last_name":"Petrova","username":"anna_p","language_code":"ru"}"#,
        ),
    ]
}

/// In-memory sink for a test subscriber.
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` under a JSON subscriber and return every event it logged.
pub(crate) fn capture_events<F: FnOnce()>(f: F) -> Vec<serde_json::Value> {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = logs.0.lock().unwrap().clone();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// Audit events among `events`.
pub(crate) fn audit_events(events: &[serde_json::Value]) -> Vec<&serde_json::Value> {
    events.iter().filter(|e| e["target"] == "audit").collect()
}

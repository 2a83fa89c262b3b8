// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Parsing of Telegram Mini-App `initData`.
//!
//! initData is a URL-query string such as
//! `query_id=...&user=%7B%22id%22%3A42...%7D&auth_date=1700000000&hash=ab12...`.
//! Values are kept exactly as decoded because the signature is computed
//! over that representation.

use std::collections::HashSet;

use serde::Deserialize;
use url::form_urlencoded;

use super::claims::TelegramIdentity;

pub const HASH_FIELD: &str = "hash";
pub const USER_FIELD: &str = "user";
pub const AUTH_DATE_FIELD: &str = "auth_date";

/// Why a claim could not be parsed.
///
/// Surfaced to clients only as `malformed_claim`; the detail is for logs.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("init data is empty")]
    Empty,
    #[error("init data is not visible ASCII")]
    InvalidEncoding,
    #[error("init data contains a duplicated field")]
    DuplicateField,
    #[error("`user` field is missing")]
    MissingUser,
    #[error("`user` field is not a valid user object")]
    InvalidUser(#[from] serde_json::Error),
    #[error("`user.id` is missing")]
    MissingUserId,
    #[error("`user.id` must be positive")]
    NonPositiveUserId,
}

impl ClaimError {
    /// Reason safe to put in logs.
    ///
    /// The JSON error is reduced to its category and position because its
    /// message quotes the offending claim content.
    pub fn log_detail(&self) -> String {
        match self {
            ClaimError::InvalidUser(e) => format!(
                "{self} ({:?} error at line {} column {})",
                e.classify(),
                e.line(),
                e.column()
            ),
            _ => self.to_string(),
        }
    }
}

/// Shape of the JSON `user` field. Everything is optional here so the
/// missing-id case gets its own error.
#[derive(Debug, Deserialize)]
struct RawUser {
    id: Option<i64>,
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
    photo_url: Option<String>,
    language_code: Option<String>,
    is_premium: Option<bool>,
}

/// Parsed initData.
#[derive(Debug, Clone)]
pub struct InitData {
    /// Every field except `hash`, in input order.
    fields: Vec<(String, String)>,
    hash: Option<String>,
    user: TelegramIdentity,
}

impl InitData {
    /// Decode a raw initData string.
    pub fn parse(raw: &str) -> Result<Self, ClaimError> {
        if raw.is_empty() {
            return Err(ClaimError::Empty);
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        let mut hash = None;

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            if !seen.insert(key.clone()) {
                return Err(ClaimError::DuplicateField);
            }
            if key == HASH_FIELD {
                hash = Some(value.into_owned());
            } else {
                fields.push((key.into_owned(), value.into_owned()));
            }
        }

        let user_json = field(&fields, USER_FIELD).ok_or(ClaimError::MissingUser)?;
        let raw_user: RawUser = serde_json::from_str(user_json)?;

        // An unparsable auth_date stays in the signed set but is not usable
        // for freshness checks.
        let auth_date = field(&fields, AUTH_DATE_FIELD).and_then(|v| v.parse::<i64>().ok());

        let user = build_identity(raw_user, auth_date)?;

        Ok(Self { fields, hash, user })
    }

    /// Signed fields (everything but `hash`) as borrowed pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Claimed signature, if the `hash` field was present.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn user(&self) -> &TelegramIdentity {
        &self.user
    }

    pub fn auth_date(&self) -> Option<i64> {
        self.user.auth_date
    }

    pub fn into_user(self) -> TelegramIdentity {
        self.user
    }
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn build_identity(raw: RawUser, auth_date: Option<i64>) -> Result<TelegramIdentity, ClaimError> {
    let id = raw.id.ok_or(ClaimError::MissingUserId)?;
    if id <= 0 {
        return Err(ClaimError::NonPositiveUserId);
    }

    Ok(TelegramIdentity {
        id,
        first_name: raw.first_name.unwrap_or_default(),
        last_name: raw.last_name.unwrap_or_default(),
        username: raw.username.unwrap_or_default(),
        photo_url: raw.photo_url.unwrap_or_default(),
        language_code: raw.language_code,
        is_premium: raw.is_premium.unwrap_or(false),
        auth_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::{encode, sample_pairs};

    #[test]
    fn parses_user_and_auth_date() {
        let raw = encode(&sample_pairs());
        let data = InitData::parse(&raw).unwrap();

        assert_eq!(data.user().id, 42);
        assert_eq!(data.user().first_name, "Anna");
        assert_eq!(data.user().username, "anna_p");
        assert_eq!(data.user().language_code.as_deref(), Some("ru"));
        assert!(!data.user().is_premium);
        assert_eq!(data.auth_date(), Some(1_700_000_000));
        assert_eq!(data.hash(), None);
    }

    #[test]
    fn hash_is_kept_out_of_signed_fields() {
        let raw = "auth_date=1&user=%7B%22id%22%3A1%7D&hash=abcd";
        let data = InitData::parse(raw).unwrap();

        assert_eq!(data.hash(), Some("abcd"));
        assert!(data.fields().all(|(k, _)| k != HASH_FIELD));
        assert_eq!(data.fields().count(), 2);
    }

    #[test]
    fn values_are_kept_verbatim_after_decoding() {
        let user = r#"{"id":5,"first_name":"  spaced  "}"#;
        let raw = encode(&[("user", user), ("note", " a+b ")]);
        let data = InitData::parse(&raw).unwrap();

        let fields: Vec<_> = data.fields().collect();
        assert_eq!(fields, vec![("user", user), ("note", " a+b ")]);
        assert_eq!(data.user().first_name, "  spaced  ");
    }

    #[test]
    fn unparsable_auth_date_is_tolerated() {
        let raw = encode(&[("auth_date", "yesterday"), ("user", r#"{"id":9}"#)]);
        let data = InitData::parse(&raw).unwrap();

        assert_eq!(data.auth_date(), None);
        assert!(data.fields().any(|(k, v)| k == "auth_date" && v == "yesterday"));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(InitData::parse(""), Err(ClaimError::Empty)));
    }

    #[test]
    fn rejects_missing_user() {
        let raw = encode(&[("auth_date", "1700000000")]);
        assert!(matches!(InitData::parse(&raw), Err(ClaimError::MissingUser)));
    }

    #[test]
    fn rejects_invalid_user_json() {
        let raw = encode(&[("user", "{not json")]);
        assert!(matches!(InitData::parse(&raw), Err(ClaimError::InvalidUser(_))));

        let raw = encode(&[("user", r#"{"id":"42"}"#)]);
        assert!(matches!(InitData::parse(&raw), Err(ClaimError::InvalidUser(_))));
    }

    #[test]
    fn log_detail_does_not_quote_claim_content() {
        let err = InitData::parse("user=%7B%22id%22%3A%22Anna%20Petrova%22%7D").unwrap_err();
        assert!(matches!(err, ClaimError::InvalidUser(_)));

        let detail = err.log_detail();
        assert!(!detail.contains("Anna"), "{detail}");
        assert!(!err.to_string().contains("Anna"));
        assert!(detail.contains("Data error at line 1"), "{detail}");
    }

    #[test]
    fn rejects_missing_or_non_positive_id() {
        let raw = encode(&[("user", r#"{"first_name":"A"}"#)]);
        assert!(matches!(InitData::parse(&raw), Err(ClaimError::MissingUserId)));

        let raw = encode(&[("user", r#"{"id":0}"#)]);
        assert!(matches!(InitData::parse(&raw), Err(ClaimError::NonPositiveUserId)));

        let raw = encode(&[("user", r#"{"id":-3}"#)]);
        assert!(matches!(InitData::parse(&raw), Err(ClaimError::NonPositiveUserId)));
    }

    #[test]
    fn rejects_duplicated_fields() {
        let raw = "user=%7B%22id%22%3A1%7D&hash=aa&hash=bb";
        assert!(matches!(InitData::parse(raw), Err(ClaimError::DuplicateField)));

        let raw = "user=%7B%22id%22%3A1%7D&user=%7B%22id%22%3A2%7D";
        assert!(matches!(InitData::parse(raw), Err(ClaimError::DuplicateField)));
    }

    #[test]
    fn garbage_input_never_panics() {
        for raw in ["%", "&&&", "=", "user", "user=", "%FF%FE=%00", "hash&user&auth_date"] {
            assert!(InitData::parse(raw).is_err(), "{raw} should be rejected");
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! initData verification: parse, recompute, compare.

use std::time::Duration;

use super::claims::{AuthenticatedUser, IdentitySource};
use super::error::AuthError;
use super::init_data::InitData;
use super::secret::SharedSecret;
use super::signature::{expected_signature, signatures_match};

/// How far in the future `auth_date` may be before a freshness check fails.
const CLOCK_SKEW_LEEWAY: i64 = 60;

/// Verifies initData against the bot token.
///
/// The secret is injected at construction and never changes. One verifier
/// is shared (behind an `Arc`) by every request.
#[derive(Debug, Clone)]
pub struct InitDataVerifier {
    secret: Option<SharedSecret>,
    max_age: Option<Duration>,
}

impl InitDataVerifier {
    /// Create a verifier. With `None`, signatures are not checked and every
    /// well-formed claim is accepted as [`IdentitySource::Unsigned`].
    pub fn new(secret: Option<SharedSecret>) -> Self {
        Self {
            secret,
            max_age: None,
        }
    }

    /// Reject claims whose `auth_date` is older than `max_age`.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Whether signatures are checked at all.
    pub fn enforces_signature(&self) -> bool {
        self.secret.is_some()
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Verify a raw initData string at the current time.
    pub fn verify(&self, raw: &str) -> Result<AuthenticatedUser, AuthError> {
        self.verify_at(raw, chrono::Utc::now().timestamp())
    }

    /// Verify a raw initData string as of `now` (Unix seconds).
    pub fn verify_at(&self, raw: &str, now: i64) -> Result<AuthenticatedUser, AuthError> {
        let init_data = InitData::parse(raw)?;

        let source = match &self.secret {
            Some(secret) => {
                let expected = expected_signature(init_data.fields(), secret);
                let claimed = init_data.hash().unwrap_or_default();
                if !signatures_match(&expected, claimed) {
                    return Err(AuthError::InvalidSignature);
                }
                IdentitySource::Signed
            }
            None => IdentitySource::Unsigned,
        };

        self.check_freshness(init_data.auth_date(), now)?;

        Ok(AuthenticatedUser::new(init_data.into_user(), source))
    }

    fn check_freshness(&self, auth_date: Option<i64>, now: i64) -> Result<(), AuthError> {
        let Some(max_age) = self.max_age else {
            return Ok(());
        };
        let auth_date = auth_date.ok_or(AuthError::StaleClaim)?;
        let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);

        let age = now.saturating_sub(auth_date);
        if age > max_age || age < -CLOCK_SKEW_LEEWAY {
            return Err(AuthError::StaleClaim);
        }
        Ok(())
    }
}

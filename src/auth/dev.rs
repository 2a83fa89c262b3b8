// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Development identity injector.
//!
//! WARNING: This bypasses initData verification completely. It is only
//! wired when `AUTH_MODE=dev` is chosen at startup, and is never used as a
//! fallback for a failed verification.

use axum::http::Uri;
use url::form_urlencoded;

use super::audit::{AuditEvent, AuditEventType};
use super::claims::{AuthenticatedUser, IdentitySource, TelegramIdentity};

/// Fixed `auth_date` stamped on every development identity.
pub const DEV_AUTH_DATE: i64 = 1_700_000_000;

/// Fabricates a fixed identity for every request.
#[derive(Debug, Clone)]
pub struct DevIdentityInjector {
    identity: TelegramIdentity,
    /// Query parameter that may override the Telegram ID.
    override_param: Option<String>,
}

impl DevIdentityInjector {
    pub fn new(identity: TelegramIdentity, override_param: Option<String>) -> Self {
        let identity = TelegramIdentity {
            auth_date: Some(DEV_AUTH_DATE),
            ..identity
        };
        Self {
            identity,
            override_param: override_param.filter(|p| !p.is_empty()),
        }
    }

    /// The identity used when no override applies.
    pub fn fixed_identity(&self) -> &TelegramIdentity {
        &self.identity
    }

    /// Build the identity for a request. Never fails.
    ///
    /// Only the ID can be overridden, and only by a positive integer in the
    /// configured query parameter. Anything else yields the fixed identity.
    pub fn inject(&self, uri: &Uri) -> TelegramIdentity {
        let mut identity = self.identity.clone();
        if let Some(id) = self.override_id(uri) {
            identity.id = id;
        }
        identity
    }

    /// [`inject`](Self::inject) wrapped as a request identity, with an audit record.
    pub fn authenticate(&self, uri: &Uri) -> AuthenticatedUser {
        let user = AuthenticatedUser::new(self.inject(uri), IdentitySource::Development);
        AuditEvent::new(AuditEventType::DevIdentityInjected)
            .with_user(user.telegram_id(), user.username())
            .with_path(uri.path())
            .emit();
        user
    }

    fn override_id(&self, uri: &Uri) -> Option<i64> {
        let param = self.override_param.as_deref()?;
        let query = uri.query()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == param)
            .and_then(|(_, value)| value.parse::<i64>().ok())
            .filter(|id| *id > 0)
    }
}

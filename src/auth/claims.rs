// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Telegram identity and the authenticated user attached to each request.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Telegram user decoded from the `user` field of initData.
///
/// Built once by the parser (or the dev injector) and never mutated
/// afterwards. Only `id` is guaranteed; every other field defaults to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TelegramIdentity {
    /// Telegram user ID (always > 0)
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Telegram `@handle` without the `@`
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub photo_url: String,
    /// IETF language tag reported by the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    /// `auth_date` of the claim (Unix seconds), if it parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_date: Option<i64>,
}

impl TelegramIdentity {
    /// Identity with only an ID set.
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            username: String::new(),
            photo_url: String::new(),
            language_code: None,
            is_premium: false,
            auth_date: None,
        }
    }

    /// Human-readable name: "First Last", falling back to the handle.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// How the identity of a request was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    /// initData signature checked against the bot token
    Signed,
    /// No bot token configured; identity taken as-is
    Unsigned,
    /// Fabricated by the development injector
    Development,
}

/// Authenticated user attached to the request extensions.
///
/// This is the only type the auth stage stores per request. Handlers read
/// it through the [`Auth`](super::Auth) or [`OptionalAuth`](super::OptionalAuth)
/// extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub identity: TelegramIdentity,
    pub source: IdentitySource,
}

impl AuthenticatedUser {
    pub fn new(identity: TelegramIdentity, source: IdentitySource) -> Self {
        Self { identity, source }
    }

    pub fn telegram_id(&self) -> i64 {
        self.identity.id
    }

    /// Telegram handle, if the user has one.
    pub fn username(&self) -> Option<&str> {
        Some(self.identity.username.as_str()).filter(|u| !u.is_empty())
    }

    pub fn display_name(&self) -> String {
        self.identity.display_name()
    }

    /// True only when the initData signature was actually checked.
    pub fn is_verified(&self) -> bool {
        self.source == IdentitySource::Signed
    }
}

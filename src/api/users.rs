// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Auth, AuthenticatedUser, IdentitySource};

/// Response for GET /v1/users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct UserMeResponse {
    /// Telegram user ID
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub display_name: String,
    pub photo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    pub is_premium: bool,
    /// How the identity was established
    pub source: IdentitySource,
}

impl From<AuthenticatedUser> for UserMeResponse {
    fn from(user: AuthenticatedUser) -> Self {
        let display_name = user.display_name();
        let identity = user.identity;
        Self {
            telegram_id: identity.id,
            first_name: identity.first_name,
            last_name: identity.last_name,
            username: identity.username,
            display_name,
            photo_url: identity.photo_url,
            language_code: identity.language_code,
            is_premium: identity.is_premium,
            source: user.source,
        }
    }
}

/// Get the Telegram user behind the current request.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("telegram_init_data" = [])),
    responses(
        (status = 200, description = "User information", body = UserMeResponse),
        (status = 401, description = "Missing, malformed, stale or forged initData"),
        (status = 503, description = "Request deadline exceeded"),
    )
)]
pub async fn get_current_user(Auth(user): Auth) -> Json<UserMeResponse> {
    Json(user.into())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::init_data::ClaimError;

/// Authentication error type.
///
/// Every variant ends the request. The response body only carries the
/// error code and a fixed message, never the claim or any key material.
#[derive(Debug)]
pub enum AuthError {
    /// No initData on a route that requires authentication
    MissingClaim,
    /// initData could not be decoded or has no usable user
    MalformedClaim(ClaimError),
    /// Recomputed signature does not match the claimed `hash`
    InvalidSignature,
    /// `auth_date` outside the configured freshness window
    StaleClaim,
    /// Request deadline passed before authentication started
    DeadlineExceeded,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingClaim => "missing_claim",
            AuthError::MalformedClaim(_) => "malformed_claim",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::StaleClaim => "stale_claim",
            AuthError::DeadlineExceeded => "deadline_exceeded",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingClaim
            | AuthError::MalformedClaim(_)
            | AuthError::InvalidSignature
            | AuthError::StaleClaim => StatusCode::UNAUTHORIZED,
            AuthError::DeadlineExceeded => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingClaim => write!(f, "Telegram authorization data required"),
            AuthError::MalformedClaim(_) => write!(f, "Invalid Telegram authorization data"),
            AuthError::InvalidSignature => write!(f, "Invalid Telegram signature"),
            AuthError::StaleClaim => write!(f, "Telegram authorization data has expired"),
            AuthError::DeadlineExceeded => write!(f, "Request deadline exceeded"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::MalformedClaim(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ClaimError> for AuthError {
    fn from(err: ClaimError) -> Self {
        AuthError::MalformedClaim(err)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

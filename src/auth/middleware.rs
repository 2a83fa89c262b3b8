// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Runs once per request in front of the protected routes:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/users/me", get(get_current_user))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         strategy.clone(),
//!         auth_middleware,
//!     ));
//! ```
//!
//! On success the [`AuthenticatedUser`] is stored in the request extensions
//! for the [`Auth`](super::Auth) extractor. On failure the request stops
//! here with a 401.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::audit::{AuditEvent, AuditEventType};
use super::dev::DevIdentityInjector;
use super::init_data::ClaimError;
use super::verifier::InitDataVerifier;
use super::{AuthError, AuthenticatedUser, IdentitySource};

/// Scheme prefix the Mini-App puts in front of initData.
pub const INIT_DATA_PREFIX: &str = "tma ";

/// Deadline of the current request, set by an outer layer.
#[derive(Debug, Clone, Copy)]
pub struct RequestDeadline(pub Instant);

impl RequestDeadline {
    pub fn has_passed(&self) -> bool {
        Instant::now() >= self.0
    }
}

/// Real initData authentication.
#[derive(Debug, Clone)]
pub struct TelegramAuth {
    verifier: Arc<InitDataVerifier>,
    require_auth: bool,
}

impl TelegramAuth {
    pub fn new(verifier: InitDataVerifier, require_auth: bool) -> Self {
        Self {
            verifier: Arc::new(verifier),
            require_auth,
        }
    }

    pub fn verifier(&self) -> &InitDataVerifier {
        &self.verifier
    }

    pub fn requires_auth(&self) -> bool {
        self.require_auth
    }

    /// Authenticate from request headers.
    ///
    /// `Ok(None)` means no claim was sent and the policy allows anonymous
    /// requests.
    pub fn authenticate(
        &self,
        headers: &HeaderMap,
        path: &str,
    ) -> Result<Option<AuthenticatedUser>, AuthError> {
        let result = self.authenticate_inner(headers);

        match &result {
            Ok(Some(user)) => {
                let event_type = match user.source {
                    IdentitySource::Signed => AuditEventType::AuthSuccess,
                    _ => AuditEventType::UnverifiedIdentityAccepted,
                };
                AuditEvent::new(event_type)
                    .with_user(user.telegram_id(), user.username())
                    .with_path(path)
                    .emit();
            }
            Ok(None) => AuditEvent::new(AuditEventType::AnonymousPassThrough)
                .with_path(path)
                .emit(),
            Err(AuthError::InvalidSignature) => AuditEvent::new(AuditEventType::InvalidSignature)
                .with_path(path)
                .failed(AuthError::InvalidSignature.error_code())
                .security_relevant()
                .emit(),
            Err(error) => {
                let mut event = AuditEvent::new(AuditEventType::AuthFailure)
                    .with_path(path)
                    .failed(error.error_code());
                if let AuthError::MalformedClaim(reason) = error {
                    event = event.with_detail(reason.log_detail());
                }
                event.emit();
            }
        }

        result
    }

    fn authenticate_inner(&self, headers: &HeaderMap) -> Result<Option<AuthenticatedUser>, AuthError> {
        let raw = headers
            .get(AUTHORIZATION)
            .map(|header| header.to_str())
            .transpose()
            .map_err(|_| AuthError::MalformedClaim(ClaimError::InvalidEncoding))?;

        // An empty header counts as no claim at all.
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            if self.require_auth {
                return Err(AuthError::MissingClaim);
            }
            return Ok(None);
        };
        let raw = raw.strip_prefix(INIT_DATA_PREFIX).unwrap_or(raw);

        self.verifier.verify(raw).map(Some)
    }
}

/// How requests are authenticated. Chosen once at startup.
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    /// Verify initData from the `Authorization` header.
    Telegram(TelegramAuth),
    /// Fabricate a development identity; no verification at all.
    Development(DevIdentityInjector),
}

impl AuthStrategy {
    pub fn mode(&self) -> &'static str {
        match self {
            AuthStrategy::Telegram(_) => "telegram",
            AuthStrategy::Development(_) => "dev",
        }
    }

    /// Whether request identities are backed by a checked signature.
    pub fn enforces_signature(&self) -> bool {
        match self {
            AuthStrategy::Telegram(auth) => auth.verifier().enforces_signature(),
            AuthStrategy::Development(_) => false,
        }
    }
}

/// Authentication middleware function.
pub async fn auth_middleware(
    State(strategy): State<AuthStrategy>,
    mut request: Request,
    next: Next,
) -> Response {
    if request
        .extensions()
        .get::<RequestDeadline>()
        .is_some_and(RequestDeadline::has_passed)
    {
        warn!(path = %request.uri().path(), "Request deadline passed before authentication");
        return AuthError::DeadlineExceeded.into_response();
    }

    let outcome = match &strategy {
        AuthStrategy::Telegram(auth) => auth.authenticate(request.headers(), request.uri().path()),
        AuthStrategy::Development(dev) => Ok(Some(dev.authenticate(request.uri()))),
    };

    match outcome {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

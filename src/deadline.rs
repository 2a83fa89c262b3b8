// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request deadline.
//!
//! Stamps each request with a [`RequestDeadline`] so inner layers can give up
//! early, and cuts off handlers that run past it.

use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::auth::RequestDeadline;
use crate::error::ApiError;

pub async fn deadline_middleware(
    State(timeout): State<Duration>,
    mut request: Request,
    next: Next,
) -> Response {
    // An unrepresentable deadline leaves the request unstamped.
    if let Some(deadline) = Instant::now().checked_add(timeout) {
        request.extensions_mut().insert(RequestDeadline(deadline));
    }

    let path = request.uri().path().to_string();
    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(path = %path, timeout_ms = timeout.as_millis() as u64, "Request deadline exceeded");
            ApiError::timeout("request deadline exceeded").into_response()
        }
    }
}

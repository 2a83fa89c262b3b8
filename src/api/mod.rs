// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::{
        health::{HealthChecks, HealthResponse, LivenessResponse},
        users::UserMeResponse,
    },
    auth::{auth_middleware, IdentitySource},
    deadline::deadline_middleware,
    error::not_found,
    state::AppState,
};

pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    // Every route below this layer sees the auth stage before its handler.
    let v1_routes = Router::new()
        .route("/users/me", get(users::get_current_user))
        .route_layer(from_fn_with_state(state.auth.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .nest("/v1", v1_routes)
        .with_state(state.clone())
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(from_fn_with_state(state.request_timeout, deadline_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct InitDataSecurity;

impl Modify for InitDataSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "telegram_init_data",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "`tma <initData>` as received by the Mini-App",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health::health, health::liveness, users::get_current_user),
    components(schemas(
        HealthResponse,
        HealthChecks,
        LivenessResponse,
        UserMeResponse,
        IdentitySource
    )),
    modifiers(&InitDataSecurity),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Users", description = "Telegram identity of the caller")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::testing::{sample_pairs, signed_init_data, BOT_TOKEN};
    use crate::auth::{
        AuthStrategy, DevIdentityInjector, InitDataVerifier, SharedSecret, TelegramAuth,
        TelegramIdentity,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn telegram_state() -> AppState {
        let verifier = InitDataVerifier::new(SharedSecret::new(BOT_TOKEN));
        AppState::new(
            AuthStrategy::Telegram(TelegramAuth::new(verifier, true)),
            Duration::from_secs(5),
        )
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, request_id, json)
    }

    fn me(auth: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri("/v1/users/me");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_public_and_reports_mode() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, request_id, body) = send(telegram_state(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(request_id.is_some());
        assert_eq!(body["checks"]["auth_mode"], "telegram");
        assert_eq!(body["checks"]["signature_verification"], true);
        assert!(!body.to_string().contains(BOT_TOKEN));
    }

    #[tokio::test]
    async fn signed_claim_returns_current_user() {
        let init_data = signed_init_data(&sample_pairs(), BOT_TOKEN);
        let (status, _, body) = send(telegram_state(), me(Some(format!("tma {init_data}")))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["telegram_id"], 42);
        assert_eq!(body["username"], "anna_p");
        assert_eq!(body["source"], "signed");
    }

    #[tokio::test]
    async fn missing_claim_is_rejected() {
        let (status, _, body) = send(telegram_state(), me(None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "missing_claim");
    }

    #[tokio::test]
    async fn forged_claim_is_rejected() {
        let init_data = signed_init_data(&sample_pairs(), "someone-else");
        let (status, _, body) = send(telegram_state(), me(Some(format!("tma {init_data}")))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "invalid_signature");
    }

    #[tokio::test]
    async fn dev_mode_returns_fixed_identity() {
        let state = AppState::new(
            AuthStrategy::Development(DevIdentityInjector::new(
                TelegramIdentity::with_id(123_456_789),
                Some("mock_telegram_id".to_string()),
            )),
            Duration::from_secs(5),
        );

        let (status, _, body) = send(state.clone(), me(None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["telegram_id"], 123_456_789);
        assert_eq!(body["source"], "development");

        let request = Request::builder()
            .uri("/v1/users/me?mock_telegram_id=777")
            .body(Body::empty())
            .unwrap();
        let (_, _, body) = send(state, request).await;
        assert_eq!(body["telegram_id"], 777);
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let request = Request::builder().uri("/v2/nothing").body(Body::empty()).unwrap();
        let (status, _, body) = send(telegram_state(), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not found");
    }

    #[test]
    fn openapi_declares_init_data_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("telegram_init_data"));
        assert!(doc.paths.paths.contains_key("/v1/users/me"));
    }
}

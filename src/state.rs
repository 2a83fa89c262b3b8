// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use crate::auth::{AuthStrategy, DevIdentityInjector, InitDataVerifier, TelegramAuth};
use crate::config::{AppConfig, AuthConfig, AuthMode};

/// Shared application state, built once from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct AppState {
    pub auth: AuthStrategy,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(auth: AuthStrategy, request_timeout: Duration) -> Self {
        Self {
            auth,
            request_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(auth_strategy(&config.auth), config.request_timeout)
    }
}

fn auth_strategy(config: &AuthConfig) -> AuthStrategy {
    match config.mode {
        AuthMode::Dev => AuthStrategy::Development(DevIdentityInjector::new(
            config.dev.identity(),
            config.dev.query_param.clone(),
        )),
        AuthMode::Telegram => {
            let mut verifier = InitDataVerifier::new(config.bot_token.clone());
            if let Some(max_age) = config.max_age {
                verifier = verifier.with_max_age(max_age);
            }
            AuthStrategy::Telegram(TelegramAuth::new(verifier, config.require_auth))
        }
    }
}

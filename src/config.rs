// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup (after an
//! optional `.env` file) and validated once. Nothing reads the environment
//! after that.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `APP_ENV` | `dev` or `production` | `dev` |
//! | `AUTH_MODE` | `telegram` (verify initData) or `dev` (fixed identity) | `telegram` |
//! | `TELEGRAM_BOT_TOKEN` | Bot token used to verify initData | Unset = signatures not checked |
//! | `REQUIRE_AUTH` | Reject requests without initData | `true` |
//! | `AUTH_MAX_AGE_SECS` | Maximum age of `auth_date` | Unset = no freshness check |
//! | `REQUEST_TIMEOUT_SECS` | Per-request deadline, 1 to 3600 | `30` |
//! | `DEV_TELEGRAM_ID` | Dev identity Telegram ID | `123456789` |
//! | `DEV_USERNAME` | Dev identity handle | `test_user` |
//! | `DEV_FIRST_NAME` | Dev identity first name | `Test` |
//! | `DEV_LAST_NAME` | Dev identity last name | `User` |
//! | `DEV_ID_QUERY_PARAM` | Query parameter overriding the dev ID (empty disables) | `mock_telegram_id` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::time::Duration;

use crate::auth::{SharedSecret, TelegramIdentity};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const APP_ENV_ENV: &str = "APP_ENV";
pub const AUTH_MODE_ENV: &str = "AUTH_MODE";
/// Environment variable holding the bot token. Never logged.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const REQUIRE_AUTH_ENV: &str = "REQUIRE_AUTH";
pub const AUTH_MAX_AGE_ENV: &str = "AUTH_MAX_AGE_SECS";
pub const REQUEST_TIMEOUT_ENV: &str = "REQUEST_TIMEOUT_SECS";
pub const DEV_TELEGRAM_ID_ENV: &str = "DEV_TELEGRAM_ID";
pub const DEV_USERNAME_ENV: &str = "DEV_USERNAME";
pub const DEV_FIRST_NAME_ENV: &str = "DEV_FIRST_NAME";
pub const DEV_LAST_NAME_ENV: &str = "DEV_LAST_NAME";
pub const DEV_ID_QUERY_PARAM_ENV: &str = "DEV_ID_QUERY_PARAM";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;
const DEFAULT_DEV_TELEGRAM_ID: i64 = 123_456_789;
const DEFAULT_DEV_QUERY_PARAM: &str = "mock_telegram_id";

/// Configuration errors. Any of these aborts startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value `{value}`: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("invalid bind address {0}")]
    InvalidBindAddress(String),
    #[error("AUTH_MODE=dev is not allowed when APP_ENV=production")]
    DevAuthInProduction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Dev,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Telegram,
    Dev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Development identity settings (only used with `AUTH_MODE=dev`).
#[derive(Debug, Clone)]
pub struct DevIdentityConfig {
    pub telegram_id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub query_param: Option<String>,
}

impl DevIdentityConfig {
    pub fn identity(&self) -> TelegramIdentity {
        TelegramIdentity {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            ..TelegramIdentity::with_id(self.telegram_id)
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub bot_token: Option<SharedSecret>,
    pub require_auth: bool,
    pub max_age: Option<Duration>,
    pub dev: DevIdentityConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub app_env: AppEnv,
    pub log_format: LogFormat,
    pub request_timeout: Duration,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(v) => parse_number::<u16>(PORT_ENV, v)?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(format!("{host}:{port}")))?;

        let app_env = match get(APP_ENV_ENV).as_deref().map(str::to_lowercase).as_deref() {
            None | Some("dev") | Some("development") => AppEnv::Dev,
            Some("production") | Some("prod") => AppEnv::Production,
            Some(other) => return Err(invalid(APP_ENV_ENV, other, "expected `dev` or `production`")),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref().map(str::to_lowercase).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(invalid(LOG_FORMAT_ENV, other, "expected `json` or `pretty`")),
        };

        let request_timeout_secs = match get(REQUEST_TIMEOUT_ENV) {
            Some(v) => parse_number::<u64>(REQUEST_TIMEOUT_ENV, v)?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&request_timeout_secs) {
            return Err(invalid(
                REQUEST_TIMEOUT_ENV,
                &request_timeout_secs.to_string(),
                "must be between 1 and 3600 seconds",
            ));
        }
        let request_timeout = Duration::from_secs(request_timeout_secs);

        let mode = match get(AUTH_MODE_ENV).as_deref().map(str::to_lowercase).as_deref() {
            None | Some("telegram") => AuthMode::Telegram,
            Some("dev") | Some("mock") => AuthMode::Dev,
            Some(other) => return Err(invalid(AUTH_MODE_ENV, other, "expected `telegram` or `dev`")),
        };
        if mode == AuthMode::Dev && app_env == AppEnv::Production {
            return Err(ConfigError::DevAuthInProduction);
        }

        let require_auth = match get(REQUIRE_AUTH_ENV) {
            Some(v) => parse_bool(REQUIRE_AUTH_ENV, &v)?,
            None => true,
        };

        let max_age = get(AUTH_MAX_AGE_ENV)
            .map(|v| parse_number::<u64>(AUTH_MAX_AGE_ENV, v))
            .transpose()?
            .map(Duration::from_secs);

        let telegram_id = match get(DEV_TELEGRAM_ID_ENV) {
            Some(v) => parse_number::<i64>(DEV_TELEGRAM_ID_ENV, v)?,
            None => DEFAULT_DEV_TELEGRAM_ID,
        };
        if telegram_id <= 0 {
            return Err(invalid(DEV_TELEGRAM_ID_ENV, &telegram_id.to_string(), "must be positive"));
        }

        // An explicitly empty DEV_ID_QUERY_PARAM disables the override.
        let query_param = match lookup(DEV_ID_QUERY_PARAM_ENV) {
            Some(v) => Some(v.trim().to_string()).filter(|v| !v.is_empty()),
            None => Some(DEFAULT_DEV_QUERY_PARAM.to_string()),
        };

        let dev = DevIdentityConfig {
            telegram_id,
            username: get(DEV_USERNAME_ENV).unwrap_or_else(|| "test_user".to_string()),
            first_name: get(DEV_FIRST_NAME_ENV).unwrap_or_else(|| "Test".to_string()),
            last_name: get(DEV_LAST_NAME_ENV).unwrap_or_else(|| "User".to_string()),
            query_param,
        };

        Ok(Self {
            bind_addr,
            app_env,
            log_format,
            request_timeout,
            auth: AuthConfig {
                mode,
                bot_token: lookup(BOT_TOKEN_ENV).and_then(SharedSecret::new),
                require_auth,
                max_age,
                dev,
            },
        })
    }
}

fn invalid(name: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        name,
        value: value.to_string(),
        reason,
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(name, &value, "expected a number"))
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, value, "expected a boolean")),
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use odnoi_krovi_server::{
    api::router,
    config::{AppConfig, AuthMode},
    state::AppState,
    telemetry::init_tracing,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; real deployments use the environment.
    let _ = dotenvy::dotenv();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    match config.auth.mode {
        AuthMode::Dev => warn!(
            telegram_id = config.auth.dev.telegram_id,
            "AUTH_MODE=dev: every request gets a fixed identity, initData is ignored"
        ),
        AuthMode::Telegram if config.auth.bot_token.is_none() => warn!(
            "TELEGRAM_BOT_TOKEN not set: initData signatures are NOT verified"
        ),
        AuthMode::Telegram => info!(
            require_auth = config.auth.require_auth,
            max_age_secs = config.auth.max_age.map(|d| d.as_secs()),
            "initData signature verification enabled"
        ),
    }

    let state = AppState::from_config(&config);
    let app = router(state);

    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %config.bind_addr, "Odnoi Krovi server listening (docs at /docs)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

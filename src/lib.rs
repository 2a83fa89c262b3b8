// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Odnoi Krovi - pet blood donation backend
//!
//! HTTP backend for the Telegram Mini-App. Every protected request carries
//! Telegram initData, which is verified against the bot token before any
//! handler runs.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - initData verification and the per-request Telegram identity
//! - `config` - Environment configuration
//! - `deadline` - Per-request deadline layer
//! - `telemetry` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod deadline;
pub mod error;
pub mod state;
pub mod telemetry;

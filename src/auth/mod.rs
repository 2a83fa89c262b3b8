// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! This module authenticates requests coming from the Telegram Mini-App.
//!
//! ## Auth Flow
//!
//! 1. Telegram opens the Mini-App and hands it signed `initData`
//! 2. Frontend sends `Authorization: tma <initData>` with every request
//! 3. Server:
//!    - Parses initData (URL-query encoded, `user` is JSON)
//!    - Recomputes the signature from the bot token
//!      (`HMAC(HMAC("WebAppData", bot_token), data_check_string)`)
//!    - Compares it with `hash` in constant time
//!    - Stores the Telegram user in the request extensions
//!
//! ## Modes
//!
//! - **telegram** with a bot token: full signature verification
//! - **telegram** without a bot token: identity accepted unverified (logged
//!   as `unverified_identity_accepted`)
//! - **dev**: fixed identity, no verification; refused in production

pub mod audit;
pub mod claims;
pub mod dev;
pub mod error;
pub mod extractor;
pub mod init_data;
pub mod middleware;
pub mod secret;
pub mod signature;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::{AuthenticatedUser, IdentitySource, TelegramIdentity};
pub use dev::DevIdentityInjector;
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use init_data::{ClaimError, InitData};
pub use middleware::{auth_middleware, AuthStrategy, RequestDeadline, TelegramAuth};
pub use secret::SharedSecret;
pub use verifier::InitDataVerifier;

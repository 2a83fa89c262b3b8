// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bot token used as initData key material.

use std::fmt;
use std::sync::Arc;

/// The Telegram bot token shared with the Mini-App host.
///
/// Loaded once at startup and handed to the verifier. The bytes are only
/// reachable inside the crate and `Debug` never prints them.
#[derive(Clone)]
pub struct SharedSecret(Arc<[u8]>);

impl SharedSecret {
    /// Wrap a bot token. Returns `None` for an empty or blank token, which
    /// callers treat as "no secret configured".
    pub fn new(token: impl AsRef<str>) -> Option<Self> {
        let token = token.as_ref();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self(Arc::from(token.as_bytes())))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_no_secret() {
        assert!(SharedSecret::new("").is_none());
        assert!(SharedSecret::new("   ").is_none());
    }

    #[test]
    fn debug_output_is_redacted() {
        let secret = SharedSecret::new("123456:ABC-DEF").unwrap();
        let printed = format!("{secret:?}");
        assert!(!printed.contains("ABC-DEF"));
        assert_eq!(secret.expose(), b"123456:ABC-DEF");
    }
}

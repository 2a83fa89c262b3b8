// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit records for authentication outcomes.
//!
//! Records go to the `audit` tracing target. Only the Telegram ID and
//! handle identify the user; names, photos and the raw initData are never
//! recorded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Types of auditable authentication events.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Signature verified, identity attached
    AuthSuccess,
    /// Request rejected by the auth stage
    AuthFailure,
    /// Claim carried a signature that does not match; likely forged
    #[serde(rename = "SECURITY_INVALID_SIGNATURE")]
    InvalidSignature,
    /// No bot token configured; identity accepted without verification
    UnverifiedIdentityAccepted,
    /// Development injector fabricated an identity
    DevIdentityInjected,
    /// No claim on an optional-auth route; request continued anonymously
    AnonymousPassThrough,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::AuthSuccess => "auth_success",
            AuditEventType::AuthFailure => "auth_failure",
            AuditEventType::InvalidSignature => "SECURITY_INVALID_SIGNATURE",
            AuditEventType::UnverifiedIdentityAccepted => "unverified_identity_accepted",
            AuditEventType::DevIdentityInjected => "dev_identity_injected",
            AuditEventType::AnonymousPassThrough => "anonymous_pass_through",
        }
    }
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    pub telegram_id: Option<i64>,
    pub username: Option<String>,
    /// Request path.
    pub path: Option<String>,
    /// Machine-readable failure code (`invalid_signature`, ...).
    pub error_code: Option<&'static str>,
    /// Internal failure detail. Logged, never returned to the client.
    pub detail: Option<String>,
    /// Marks events an operator should look at (forgery attempts).
    pub security: bool,
}

impl AuditEvent {
    /// Create a new audit event.
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            telegram_id: None,
            username: None,
            path: None,
            error_code: None,
            detail: None,
            security: false,
        }
    }

    /// Set the Telegram user. An empty handle is left out.
    pub fn with_user(mut self, telegram_id: i64, username: Option<&str>) -> Self {
        self.telegram_id = Some(telegram_id);
        self.username = username.map(str::to_string);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Mark as failed with an error code.
    pub fn failed(mut self, error_code: &'static str) -> Self {
        self.error_code = Some(error_code);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn security_relevant(mut self) -> Self {
        self.security = true;
        self
    }

    pub fn success(&self) -> bool {
        self.error_code.is_none()
    }

    /// Write the event to the `audit` target.
    pub fn emit(&self) {
        match self.event_type {
            AuditEventType::AuthFailure
            | AuditEventType::InvalidSignature
            | AuditEventType::UnverifiedIdentityAccepted => warn!(
                target: "audit",
                event = self.event_type.as_str(),
                event_id = %self.event_id,
                timestamp = %self.timestamp.to_rfc3339(),
                telegram_id = self.telegram_id,
                username = self.username.as_deref(),
                path = self.path.as_deref(),
                error_code = self.error_code,
                detail = self.detail.as_deref(),
                security = self.security,
                success = self.success(),
                "authentication audit"
            ),
            AuditEventType::AuthSuccess
            | AuditEventType::DevIdentityInjected
            | AuditEventType::AnonymousPassThrough => info!(
                target: "audit",
                event = self.event_type.as_str(),
                event_id = %self.event_id,
                timestamp = %self.timestamp.to_rfc3339(),
                telegram_id = self.telegram_id,
                username = self.username.as_deref(),
                path = self.path.as_deref(),
                success = self.success(),
                "authentication audit"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_is_successful_by_default() {
        let event = AuditEvent::new(AuditEventType::AuthSuccess).with_user(42, Some("anna_p"));
        assert!(event.success());
        assert_eq!(event.telegram_id, Some(42));
        assert_eq!(event.username.as_deref(), Some("anna_p"));
        assert!(!event.security);
    }

    #[test]
    fn failed_event_carries_code() {
        let event = AuditEvent::new(AuditEventType::AuthFailure)
            .with_path("/v1/users/me")
            .failed("invalid_signature")
            .security_relevant();
        assert!(!event.success());
        assert_eq!(event.error_code, Some("invalid_signature"));
        assert!(event.security);
    }

    #[test]
    fn serializes_without_names_or_claim() {
        let event = AuditEvent::new(AuditEventType::AuthSuccess).with_user(42, None);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "auth_success");
        assert_eq!(json["telegram_id"], 42);
        assert!(json.get("first_name").is_none());
        assert!(json["username"].is_null());
    }

    #[test]
    fn forged_signature_uses_security_event_name() {
        let event = AuditEvent::new(AuditEventType::InvalidSignature)
            .failed("invalid_signature")
            .security_relevant();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(AuditEventType::InvalidSignature.as_str(), "SECURITY_INVALID_SIGNATURE");
        assert_eq!(json["event_type"], "SECURITY_INVALID_SIGNATURE");
        assert_eq!(json["security"], true);
    }

    #[test]
    fn event_ids_are_unique() {
        let a = AuditEvent::new(AuditEventType::AuthSuccess);
        let b = AuditEvent::new(AuditEventType::AuthSuccess);
        assert_ne!(a.event_id, b.event_id);
    }
}

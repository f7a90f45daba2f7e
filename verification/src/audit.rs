//! Audit-log boundary.
//!
//! Every state change the service makes is offered to an [`AuditSink`]. Sink
//! failures are logged and never fail the operation that produced the event.

use kyc_types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    VerificationStarted,
    StepCompleted,
    DocumentUploaded,
    DocumentProcessed,
    BiometricSubmitted,
    BiometricProcessed,
    SessionReviewed,
    SessionExpired,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerificationStarted => "verification_started",
            Self::StepCompleted => "step_completed",
            Self::DocumentUploaded => "document_uploaded",
            Self::DocumentProcessed => "document_processed",
            Self::BiometricSubmitted => "biometric_submitted",
            Self::BiometricProcessed => "biometric_processed",
            Self::SessionReviewed => "session_reviewed",
            Self::SessionExpired => "session_expired",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub user_id: UserId,
    pub action: AuditAction,
    pub details: serde_json::Value,
    pub at: Timestamp,
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Writes audit events as structured `tracing` records under the
/// `kyc_audit` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        tracing::info!(
            target: "kyc_audit",
            user = %event.user_id,
            action = %event.action,
            at = event.at.as_secs(),
            details = %event.details,
            "audit"
        );
        Ok(())
    }
}

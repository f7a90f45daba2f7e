//! Events emitted by the service for downstream consumers (notifications,
//! attestation issuance, dashboards). Drained with
//! [`crate::VerificationService::drain_events`].

use kyc_types::{
    RecordId, RecordStatus, SessionId, SessionStatus, StepId, StepType, UserId,
    VerificationLevel,
};

#[derive(Clone, Debug, PartialEq)]
pub enum VerificationEvent {
    /// A new session was created.
    SessionStarted {
        session: SessionId,
        user: UserId,
        level: VerificationLevel,
    },
    StepCompleted {
        session: SessionId,
        step: StepId,
        step_type: StepType,
    },
    /// Every required step is approved.
    ReadyForReview { session: SessionId },
    DocumentProcessed {
        session: SessionId,
        record: RecordId,
        status: RecordStatus,
    },
    BiometricProcessed {
        session: SessionId,
        record: RecordId,
        status: RecordStatus,
    },
    SessionReviewed {
        session: SessionId,
        status: SessionStatus,
    },
    SessionExpired { session: SessionId },
}

impl VerificationEvent {
    pub fn session(&self) -> &SessionId {
        match self {
            Self::SessionStarted { session, .. }
            | Self::StepCompleted { session, .. }
            | Self::ReadyForReview { session }
            | Self::DocumentProcessed { session, .. }
            | Self::BiometricProcessed { session, .. }
            | Self::SessionReviewed { session, .. }
            | Self::SessionExpired { session } => session,
        }
    }
}

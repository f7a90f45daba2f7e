use kyc_store::StoreError;
use kyc_types::{
    BiometricType, DocumentType, SessionId, SessionStatus, StepId, VerificationLevel,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("no authenticated user")]
    NotAuthenticated,

    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("step not found: {step} in session {session}")]
    StepNotFound { session: SessionId, step: StepId },

    #[error("step already completed: {0}")]
    StepAlreadyCompleted(StepId),

    #[error("verification level {0} has no steps configured")]
    NoStepsConfigured(VerificationLevel),

    #[error("session {session} is {status} and no longer accepts changes")]
    SessionNotActive {
        session: SessionId,
        status: SessionStatus,
    },

    #[error("session {session} cannot move from {from} to {to}")]
    InvalidTransition {
        session: SessionId,
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("document verification failed for {document_type}: {reason}")]
    Document {
        document_type: DocumentType,
        reason: DocumentRejection,
    },

    #[error("biometric verification failed for {biometric_type}: {reason}")]
    Biometric {
        biometric_type: BiometricType,
        confidence: Option<f64>,
        reason: String,
    },

    #[error("verification provider error: {0}")]
    Provider(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Other(String),
}

impl VerificationError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::StepNotFound { .. } => "STEP_NOT_FOUND",
            Self::StepAlreadyCompleted(_) => "STEP_ALREADY_COMPLETED",
            Self::NoStepsConfigured(_) => "NO_STEPS_CONFIGURED",
            Self::SessionNotActive { .. } => "SESSION_NOT_ACTIVE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Document { .. } => "DOCUMENT_VERIFICATION_ERROR",
            Self::Biometric { .. } => "BIOMETRIC_VERIFICATION_ERROR",
            Self::Provider(_) => "PROVIDER_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::Other(_) => "VERIFICATION_ERROR",
        }
    }

    /// The document rejection reason, if this is a document error.
    pub fn document_rejection(&self) -> Option<&DocumentRejection> {
        match self {
            Self::Document { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Why a document was refused at intake.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DocumentRejection {
    #[error("no constraints configured for this document type")]
    UnsupportedDocumentType,

    #[error("file is empty")]
    EmptyFile,

    #[error("format {mime_type} is not accepted (accepted: {})", .accepted.join(", "))]
    UnsupportedFormat {
        mime_type: String,
        accepted: Vec<String>,
    },

    #[error("file size {size} bytes exceeds maximum of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },
}

impl DocumentRejection {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedDocumentType => "unsupported_document_type",
            Self::EmptyFile => "empty_file",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::FileTooLarge { .. } => "file_too_large",
        }
    }
}

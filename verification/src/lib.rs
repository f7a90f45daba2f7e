//! Identity verification sessions.
//!
//! A user starts a session at a [`kyc_types::VerificationLevel`]; the
//! [`VerificationConfig`] table turns the level into an ordered list of
//! steps. Steps are approved one by one; once every required step is
//! approved the session waits for a reviewer. Documents and biometric
//! captures are validated at intake and scored asynchronously by a pluggable
//! [`DocumentVerifier`] / [`BiometricVerifier`].
//!
//! [`VerificationService`] ties it together on top of a
//! [`kyc_store::SessionStore`].

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod intake;
pub mod locks;
pub mod progression;
pub mod requirements;
pub mod service;
pub mod verifier;

pub use audit::{AuditAction, AuditError, AuditEvent, AuditSink, TracingAuditSink};
pub use auth::{AuthMethod, AuthProvider, AuthenticatedUser, StaticAuthProvider};
pub use config::{ConfigError, ServiceConfig};
pub use error::{DocumentRejection, VerificationError};
pub use events::VerificationEvent;
pub use locks::SessionLocks;
pub use progression::{ReviewDecision, StepData, StepOutcome};
pub use requirements::{DocumentConstraints, LevelRequirements, VerificationConfig};
pub use service::{ServiceBuilder, VerificationService, STAT_NAMES};
pub use verifier::{
    BiometricAssessment, BiometricVerifier, DocumentAssessment, DocumentVerifier,
    SimulatedBiometricVerifier, SimulatedDocumentVerifier,
};

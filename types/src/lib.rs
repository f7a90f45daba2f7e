//! Fundamental types for the KYC verification engine.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identifiers, timestamps, verification levels and statuses, and the session
//! data model (sessions, steps, document and biometric records).

pub mod biometric;
pub mod document;
pub mod id;
pub mod level;
pub mod session;
pub mod state;
pub mod time;

pub use biometric::{BiometricData, BiometricType};
pub use document::{DocumentType, DocumentUpload, UploadedFile};
pub use id::{RecordId, SessionId, StepId, UserId};
pub use level::{StepType, VerificationLevel};
pub use session::{VerificationProgress, VerificationSession, VerificationStep};
pub use state::{RecordStatus, SessionStatus, StepStatus};
pub use time::{Clock, SystemClock, Timestamp};

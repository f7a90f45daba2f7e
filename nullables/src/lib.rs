//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the verification service (clock, signed-in
//! user, audit log, verification providers) sits behind a trait. This crate
//! provides implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record what they were asked to do
//!
//! Usage: swap real implementations for nullables in tests.

pub mod audit;
pub mod auth;
pub mod clock;
pub mod verifier;

pub use audit::NullAuditSink;
pub use auth::NullAuthProvider;
pub use clock::NullClock;
pub use verifier::{FixedBiometricVerifier, FixedDocumentVerifier};

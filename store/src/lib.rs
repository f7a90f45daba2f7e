//! Session storage for the KYC verification engine.
//!
//! The service depends only on the [`SessionStore`] trait. The in-memory
//! [`MemorySessionStore`] is the production backend: sessions are
//! process-local and never persisted.

pub mod error;
pub mod memory;
pub mod session;

pub use error::StoreError;
pub use memory::MemorySessionStore;
pub use session::SessionStore;

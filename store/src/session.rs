//! Session storage trait.

use crate::StoreError;
use kyc_types::{SessionId, UserId, VerificationSession};

/// Keyed collection of verification sessions with a per-user index.
///
/// Implementations hand out clones; callers write changes back with
/// [`SessionStore::put_session`]. Serializing read-modify-write cycles on one
/// session is the caller's job.
pub trait SessionStore: Send + Sync {
    /// Insert a session that must not exist yet.
    fn insert_session(&self, session: &VerificationSession) -> Result<(), StoreError>;

    /// Overwrite an existing session.
    fn put_session(&self, session: &VerificationSession) -> Result<(), StoreError>;

    /// Fetch a session by id.
    fn get_session(&self, id: &SessionId) -> Result<VerificationSession, StoreError>;

    /// All sessions owned by a user, oldest first.
    fn sessions_for_user(&self, user: &UserId) -> Result<Vec<VerificationSession>, StoreError>;

    /// Every stored session, in no particular order.
    fn iter_sessions(&self) -> Result<Vec<VerificationSession>, StoreError>;

    fn session_count(&self) -> Result<u64, StoreError>;

    /// The user's open session (in progress or sent back for updates), if any.
    fn open_session_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<VerificationSession>, StoreError> {
        Ok(self
            .sessions_for_user(user)?
            .into_iter()
            .rev()
            .find(|s| s.status.is_open()))
    }
}

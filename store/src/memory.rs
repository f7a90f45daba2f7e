//! In-memory session store.

use crate::{SessionStore, StoreError};
use kyc_types::{SessionId, UserId, VerificationSession};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, VerificationSession>,
    by_user: HashMap<UserId, Vec<SessionId>>,
}

/// A thread-safe in-memory session store with a secondary index by user.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Inner>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("session store mutex poisoned".into()))
    }
}

impl SessionStore for MemorySessionStore {
    fn insert_session(&self, session: &VerificationSession) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.sessions.contains_key(&session.id) {
            return Err(StoreError::Duplicate(session.id.to_string()));
        }
        inner
            .by_user
            .entry(session.user_id.clone())
            .or_default()
            .push(session.id.clone());
        inner.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn put_session(&self, session: &VerificationSession) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        match inner.sessions.get_mut(&session.id) {
            Some(existing) => {
                *existing = session.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(session.id.to_string())),
        }
    }

    fn get_session(&self, id: &SessionId) -> Result<VerificationSession, StoreError> {
        self.lock()?
            .sessions
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn sessions_for_user(&self, user: &UserId) -> Result<Vec<VerificationSession>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .by_user
            .get(user)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.sessions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn iter_sessions(&self) -> Result<Vec<VerificationSession>, StoreError> {
        Ok(self.lock()?.sessions.values().cloned().collect())
    }

    fn session_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.sessions.len() as u64)
    }
}

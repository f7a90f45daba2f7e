//! Nullable auth: a signed-in user you control.

use kyc_types::UserId;
use kyc_verification::{AuthMethod, AuthProvider, AuthenticatedUser};
use std::sync::Mutex;

/// An auth provider whose session is set by the test.
#[derive(Debug, Default)]
pub struct NullAuthProvider {
    current: Mutex<Option<(AuthenticatedUser, AuthMethod)>>,
}

impl NullAuthProvider {
    /// Nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// `user` signed in by email.
    pub fn signed_in(user: impl Into<UserId>) -> Self {
        let provider = Self::default();
        provider.sign_in(AuthenticatedUser::new(user), AuthMethod::Email);
        provider
    }

    pub fn sign_in(&self, user: AuthenticatedUser, method: AuthMethod) {
        *self.current.lock().unwrap() = Some((user, method));
    }

    pub fn sign_out(&self) {
        *self.current.lock().unwrap() = None;
    }
}

impl AuthProvider for NullAuthProvider {
    fn current_user(&self) -> Option<AuthenticatedUser> {
        self.current.lock().unwrap().as_ref().map(|(u, _)| u.clone())
    }

    fn current_method(&self) -> Option<AuthMethod> {
        self.current.lock().unwrap().as_ref().map(|(_, m)| *m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_and_out() {
        let auth = NullAuthProvider::signed_out();
        assert!(auth.current_user().is_none());

        auth.sign_in(AuthenticatedUser::new("usr_a"), AuthMethod::Passkey);
        assert_eq!(auth.current_user().unwrap().id, UserId::new("usr_a"));
        assert_eq!(auth.current_method(), Some(AuthMethod::Passkey));

        auth.sign_out();
        assert!(auth.current_user().is_none());
        assert!(auth.current_method().is_none());
    }
}

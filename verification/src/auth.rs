//! Authenticated-user boundary.
//!
//! Authentication itself (email links, SMS codes, wallets, social login,
//! passkeys) happens upstream. The service only asks who is signed in and how.

use kyc_types::UserId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Email,
    Sms,
    Wallet,
    Google,
    Passkey,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: Option<String>,
    pub wallet_address: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
            wallet_address: None,
        }
    }
}

pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<AuthenticatedUser>;

    fn current_method(&self) -> Option<AuthMethod>;
}

/// A provider with a fixed signed-in user, for callers that authenticate
/// before constructing the service (the daemon, request-scoped services).
#[derive(Clone, Debug)]
pub struct StaticAuthProvider {
    user: AuthenticatedUser,
    method: AuthMethod,
}

impl StaticAuthProvider {
    pub fn new(user: AuthenticatedUser, method: AuthMethod) -> Self {
        Self { user, method }
    }
}

impl AuthProvider for StaticAuthProvider {
    fn current_user(&self) -> Option<AuthenticatedUser> {
        Some(self.user.clone())
    }

    fn current_method(&self) -> Option<AuthMethod> {
        Some(self.method)
    }
}

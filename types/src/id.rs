//! Opaque identifiers for users, sessions, steps and intake records.
//!
//! Generated ids are a short prefix followed by 12 random bytes in hex, e.g.
//! `ses_4f1c...`. User ids come from the auth provider and are taken verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

fn random_suffix() -> String {
    hex::encode(rand::random::<[u8; 12]>())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// A fresh random identifier carrying this type's prefix.
            pub fn generate() -> Self {
                Self(format!("{}{}", Self::PREFIX, random_suffix()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Identifier of an authenticated user, as issued by the auth provider.
    UserId,
    "usr_"
);
string_id!(
    /// Identifier of a verification session.
    SessionId,
    "ses_"
);
string_id!(
    /// Identifier of a step within a session.
    StepId,
    "stp_"
);
string_id!(
    /// Identifier of a document or biometric record.
    RecordId,
    "rec_"
);

//! Status enums for sessions, steps and intake records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a verification session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    /// The user is working through the steps.
    InProgress,
    /// Every required step is approved; awaiting a reviewer.
    PendingReview,
    Approved,
    Rejected,
    Expired,
    /// A reviewer sent one or more steps back to the user.
    RequiresUpdate,
}

impl SessionStatus {
    /// Whether the user can still complete steps in this status.
    pub fn accepts_steps(&self) -> bool {
        matches!(
            self,
            Self::InProgress | Self::PendingReview | Self::RequiresUpdate
        )
    }

    /// Whether the session is still open for the user to work on.
    ///
    /// A user has at most one open session at a time.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::InProgress | Self::RequiresUpdate)
    }

    /// Approved, rejected and expired sessions never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Expired)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
            Self::RequiresUpdate => "requires_update",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    NotStarted,
    InProgress,
    Approved,
}

/// Status of a document or biometric record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Accepted on intake; the verifier has not reported yet.
    Processing,
    Verified,
    Rejected,
}

impl RecordStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_do_not_accept_steps() {
        for status in [
            SessionStatus::Approved,
            SessionStatus::Rejected,
            SessionStatus::Expired,
        ] {
            assert!(status.is_terminal());
            assert!(!status.accepts_steps());
        }
        assert!(SessionStatus::PendingReview.accepts_steps());
        assert!(!SessionStatus::PendingReview.is_open());
    }

    #[test]
    fn only_processing_records_are_unsettled() {
        assert!(!RecordStatus::Processing.is_terminal());
        assert!(RecordStatus::Verified.is_terminal());
        assert!(RecordStatus::Rejected.is_terminal());
    }
}

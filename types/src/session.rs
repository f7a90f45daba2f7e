//! The verification session and its steps.

use crate::{
    BiometricData, DocumentUpload, RecordId, SessionId, SessionStatus, StepId, StepStatus,
    StepType, Timestamp, UserId, VerificationLevel,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One user's progress through a chosen verification level.
///
/// While `status` is `InProgress`, exactly one step is `InProgress` and
/// `current_step` names it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub level: VerificationLevel,
    pub status: SessionStatus,
    /// Steps in generation order: required first, then optional.
    pub steps: Vec<VerificationStep>,
    pub current_step: StepId,
    pub documents: Vec<DocumentUpload>,
    pub biometrics: Vec<BiometricData>,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl VerificationSession {
    pub fn step(&self, id: &StepId) -> Option<&VerificationStep> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub fn step_mut(&mut self, id: &StepId) -> Option<&mut VerificationStep> {
        self.steps.iter_mut().find(|s| &s.id == id)
    }

    /// First step of the given kind.
    pub fn step_of_type(&self, step_type: StepType) -> Option<&VerificationStep> {
        self.steps.iter().find(|s| s.step_type == step_type)
    }

    pub fn current(&self) -> Option<&VerificationStep> {
        self.step(&self.current_step)
    }

    pub fn document(&self, id: &RecordId) -> Option<&DocumentUpload> {
        self.documents.iter().find(|d| &d.id == id)
    }

    pub fn document_mut(&mut self, id: &RecordId) -> Option<&mut DocumentUpload> {
        self.documents.iter_mut().find(|d| &d.id == id)
    }

    pub fn biometric(&self, id: &RecordId) -> Option<&BiometricData> {
        self.biometrics.iter().find(|b| &b.id == id)
    }

    pub fn biometric_mut(&mut self, id: &RecordId) -> Option<&mut BiometricData> {
        self.biometrics.iter_mut().find(|b| &b.id == id)
    }

    pub fn all_required_approved(&self) -> bool {
        self.steps
            .iter()
            .filter(|s| s.required)
            .all(|s| s.status == StepStatus::Approved)
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.has_passed(now)
    }

    pub fn progress(&self) -> VerificationProgress {
        let completed = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Approved)
            .count();
        let required_total = self.steps.iter().filter(|s| s.required).count();
        let required_completed = self
            .steps
            .iter()
            .filter(|s| s.required && s.status == StepStatus::Approved)
            .count();
        let percent = if required_total == 0 {
            100
        } else {
            (required_completed * 100 / required_total) as u8
        };
        VerificationProgress {
            completed,
            total: self.steps.len(),
            required_completed,
            required_total,
            percent,
        }
    }
}

/// One discrete unit of the verification flow, owned by its session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationStep {
    pub id: StepId,
    pub step_type: StepType,
    pub required: bool,
    pub status: StepStatus,
    /// Position in the session's step list.
    pub order: u32,
    pub completed_at: Option<Timestamp>,
    /// Caller-supplied data captured at completion.
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl VerificationStep {
    pub fn new(step_type: StepType, required: bool, order: u32) -> Self {
        Self {
            id: StepId::generate(),
            step_type,
            required,
            status: StepStatus::NotStarted,
            order,
            completed_at: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// Completion summary; `percent` counts required steps only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationProgress {
    pub completed: usize,
    pub total: usize,
    pub required_completed: usize,
    pub required_total: usize,
    pub percent: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(steps: Vec<VerificationStep>) -> VerificationSession {
        VerificationSession {
            id: SessionId::new("ses_test"),
            user_id: UserId::new("alice"),
            level: VerificationLevel::Standard,
            status: SessionStatus::InProgress,
            current_step: steps[0].id.clone(),
            steps,
            documents: Vec::new(),
            biometrics: Vec::new(),
            started_at: Timestamp::new(0),
            expires_at: Timestamp::new(100),
            completed_at: None,
        }
    }

    #[test]
    fn progress_counts_required_steps_only_for_percent() {
        let mut steps = vec![
            VerificationStep::new(StepType::EmailVerification, true, 0),
            VerificationStep::new(StepType::PhoneVerification, true, 1),
            VerificationStep::new(StepType::AddressVerification, false, 2),
        ];
        steps[0].status = StepStatus::Approved;
        steps[2].status = StepStatus::Approved;
        let p = session_with(steps).progress();
        assert_eq!(p.completed, 2);
        assert_eq!(p.total, 3);
        assert_eq!(p.required_completed, 1);
        assert_eq!(p.required_total, 2);
        assert_eq!(p.percent, 50);
    }

    #[test]
    fn expiry_is_checked_against_given_time() {
        let session = session_with(vec![VerificationStep::new(
            StepType::EmailVerification,
            true,
            0,
        )]);
        assert!(!session.is_expired_at(Timestamp::new(99)));
        assert!(session.is_expired_at(Timestamp::new(100)));
    }
}

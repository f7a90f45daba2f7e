//! Step progression engine.
//!
//! Pure functions over a [`VerificationSession`]: building the step list for
//! a level, completing steps, reviewer decisions and expiry. Nothing here
//! touches the store, the clock or the audit log; the service does that.
//!
//! Steps are worked strictly in generation order (required first, then
//! optional). While a session is in progress exactly one step is in progress
//! and `current_step` names it.

use crate::error::VerificationError;
use crate::requirements::LevelRequirements;
use kyc_types::{
    SessionId, SessionStatus, StepId, StepStatus, StepType, Timestamp, UserId,
    VerificationLevel, VerificationSession, VerificationStep,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-supplied data merged into a step's metadata on completion.
pub type StepData = BTreeMap<String, serde_json::Value>;

/// What a successful [`complete_step`] did to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The completed step was current; `next` is now in progress.
    Advanced { next: StepId },
    /// Every required step is approved; the session awaits review.
    ReadyForReview,
    /// The step was recorded without moving the session forward.
    Recorded,
}

/// A reviewer's verdict on a session awaiting review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject { reason: String },
    /// Send the named steps back to the user.
    RequestUpdate { steps: Vec<StepType>, reason: String },
}

impl ReviewDecision {
    pub fn target_status(&self) -> SessionStatus {
        match self {
            Self::Approve => SessionStatus::Approved,
            Self::Reject { .. } => SessionStatus::Rejected,
            Self::RequestUpdate { .. } => SessionStatus::RequiresUpdate,
        }
    }
}

/// Expand a level's requirements into step records.
///
/// Order is list position; the first step is in progress, the rest not started.
pub fn build_steps(requirements: &LevelRequirements) -> Vec<VerificationStep> {
    let mut steps: Vec<VerificationStep> = requirements
        .ordered()
        .enumerate()
        .map(|(order, (step_type, required))| {
            VerificationStep::new(step_type, required, order as u32)
        })
        .collect();
    if let Some(first) = steps.first_mut() {
        first.status = StepStatus::InProgress;
    }
    steps
}

/// Build a fresh in-progress session for `user_id`.
pub fn new_session(
    user_id: UserId,
    level: VerificationLevel,
    requirements: &LevelRequirements,
    now: Timestamp,
    expiry_secs: u64,
) -> Result<VerificationSession, VerificationError> {
    let steps = build_steps(requirements);
    let current_step = steps
        .first()
        .map(|s| s.id.clone())
        .ok_or(VerificationError::NoStepsConfigured(level))?;

    Ok(VerificationSession {
        id: SessionId::generate(),
        user_id,
        level,
        status: SessionStatus::InProgress,
        steps,
        current_step,
        documents: Vec::new(),
        biometrics: Vec::new(),
        started_at: now,
        expires_at: now.plus_secs(expiry_secs),
        completed_at: None,
    })
}

/// Approve a step and move the session forward.
pub fn complete_step(
    session: &mut VerificationSession,
    step_id: &StepId,
    data: Option<StepData>,
    now: Timestamp,
) -> Result<StepOutcome, VerificationError> {
    if !session.status.accepts_steps() {
        return Err(VerificationError::SessionNotActive {
            session: session.id.clone(),
            status: session.status,
        });
    }

    let session_id = session.id.clone();
    let step = session
        .step_mut(step_id)
        .ok_or_else(|| VerificationError::StepNotFound {
            session: session_id,
            step: step_id.clone(),
        })?;

    if step.status == StepStatus::Approved {
        return Err(VerificationError::StepAlreadyCompleted(step_id.clone()));
    }

    step.status = StepStatus::Approved;
    step.completed_at = Some(now);
    if let Some(data) = data {
        step.metadata.extend(data);
    }

    let advanced = if session.current_step == *step_id {
        advance_current(session)
    } else {
        None
    };

    if session.status.is_open() && session.all_required_approved() {
        session.status = SessionStatus::PendingReview;
        session.completed_at = Some(now);
        return Ok(StepOutcome::ReadyForReview);
    }

    Ok(match advanced {
        Some(next) => StepOutcome::Advanced { next },
        None => StepOutcome::Recorded,
    })
}

/// Point `current_step` at the earliest unapproved step and mark it in
/// progress. Leaves `current_step` alone when every step is approved.
fn advance_current(session: &mut VerificationSession) -> Option<StepId> {
    let next = session
        .steps
        .iter_mut()
        .find(|s| s.status != StepStatus::Approved)?;
    next.status = StepStatus::InProgress;
    session.current_step = next.id.clone();
    Some(next.id.clone())
}

/// Apply a reviewer decision to a session awaiting review.
pub fn apply_review(
    session: &mut VerificationSession,
    decision: &ReviewDecision,
) -> Result<SessionStatus, VerificationError> {
    let to = decision.target_status();
    if session.status != SessionStatus::PendingReview {
        return Err(VerificationError::InvalidTransition {
            session: session.id.clone(),
            from: session.status,
            to,
        });
    }

    if let ReviewDecision::RequestUpdate { steps, .. } = decision {
        reopen_steps(session, steps)?;
    }
    session.status = to;
    Ok(to)
}

/// Reset every step of the given kinds and make the earliest one current.
fn reopen_steps(
    session: &mut VerificationSession,
    step_types: &[StepType],
) -> Result<(), VerificationError> {
    if !session
        .steps
        .iter()
        .any(|s| step_types.contains(&s.step_type))
    {
        return Err(VerificationError::Other(format!(
            "session {} has none of the steps named for update",
            session.id
        )));
    }

    for step in &mut session.steps {
        if step_types.contains(&step.step_type) {
            step.status = StepStatus::NotStarted;
            step.completed_at = None;
            step.metadata.clear();
        } else if step.status == StepStatus::InProgress {
            step.status = StepStatus::NotStarted;
        }
    }
    session.completed_at = None;
    advance_current(session);
    Ok(())
}

/// Mark an open session expired if its deadline has passed.
///
/// Returns whether the session changed.
pub fn expire_if_stale(session: &mut VerificationSession, now: Timestamp) -> bool {
    if session.status.is_open() && session.is_expired_at(now) {
        session.status = SessionStatus::Expired;
        true
    } else {
        false
    }
}

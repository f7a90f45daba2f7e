use proptest::prelude::*;

use kyc_types::{SessionStatus, StepStatus, Timestamp, UserId, VerificationLevel};
use kyc_verification::progression::{self, StepOutcome};
use kyc_verification::{VerificationConfig, VerificationError};

fn level_strategy() -> impl Strategy<Value = VerificationLevel> {
    prop_oneof![
        Just(VerificationLevel::Basic),
        Just(VerificationLevel::Standard),
        Just(VerificationLevel::Enhanced),
        Just(VerificationLevel::Premium),
    ]
}

proptest! {
    /// Any sequence of step completions keeps the session consistent:
    /// one in-progress step while in progress, review exactly when every
    /// required step is approved, and no step approved twice.
    #[test]
    fn completions_keep_session_consistent(
        level in level_strategy(),
        picks in prop::collection::vec(0usize..16, 0..24),
    ) {
        let requirements = VerificationConfig::standard().level(level);
        let mut session = progression::new_session(
            UserId::new("usr_prop"),
            level,
            &requirements,
            Timestamp::new(0),
            3_600,
        ).unwrap();
        let generated: Vec<_> = session.steps.iter().map(|s| (s.step_type, s.required)).collect();
        prop_assert_eq!(generated, requirements.ordered().collect::<Vec<_>>());
        let mut approved = 0usize;

        for (tick, pick) in picks.into_iter().enumerate() {
            let idx = pick % session.steps.len();
            let step_id = session.steps[idx].id.clone();
            let was_approved = session.steps[idx].status == StepStatus::Approved;

            match progression::complete_step(&mut session, &step_id, None, Timestamp::new(tick as u64)) {
                Ok(outcome) => {
                    prop_assert!(!was_approved);
                    approved += 1;
                    if outcome == StepOutcome::ReadyForReview {
                        prop_assert!(session.all_required_approved());
                    }
                }
                Err(VerificationError::StepAlreadyCompleted(id)) => {
                    prop_assert!(was_approved);
                    prop_assert_eq!(id, step_id);
                }
                Err(e) => prop_assert!(false, "unexpected error: {}", e),
            }

            let progress = session.progress();
            prop_assert_eq!(progress.completed, approved);
            prop_assert!(progress.percent <= 100);

            if session.status == SessionStatus::InProgress {
                let in_progress: Vec<_> = session
                    .steps
                    .iter()
                    .filter(|s| s.status == StepStatus::InProgress)
                    .collect();
                prop_assert_eq!(in_progress.len(), 1);
                prop_assert_eq!(&in_progress[0].id, &session.current_step);
            }
            prop_assert_eq!(
                session.status == SessionStatus::PendingReview,
                session.all_required_approved()
            );
            prop_assert_eq!(
                session.completed_at.is_some(),
                session.status == SessionStatus::PendingReview
            );
        }
    }

    /// Expiry only ever applies at or after the deadline.
    #[test]
    fn expiry_respects_deadline(expiry in 1u64..100_000, now in 0u64..200_000) {
        let requirements = VerificationConfig::standard().level(VerificationLevel::Basic);
        let mut session = progression::new_session(
            UserId::new("usr_prop"),
            VerificationLevel::Basic,
            &requirements,
            Timestamp::new(0),
            expiry,
        ).unwrap();
        let expired = progression::expire_if_stale(&mut session, Timestamp::new(now));
        prop_assert_eq!(expired, now >= expiry);
        prop_assert_eq!(session.status == SessionStatus::Expired, expired);
    }
}

#[test]
fn every_configured_level_builds_a_session() {
    let config = VerificationConfig::standard();
    for level in VerificationLevel::ALL {
        let result = progression::new_session(
            UserId::new("usr_prop"),
            level,
            &config.level(level),
            Timestamp::new(0),
            60,
        );
        match level {
            VerificationLevel::None => assert!(matches!(
                result,
                Err(VerificationError::NoStepsConfigured(VerificationLevel::None))
            )),
            _ => assert!(result.unwrap().steps.iter().any(|s| s.required)),
        }
    }
}

use proptest::prelude::*;

use kyc_types::{SessionId, StepType, Timestamp, VerificationLevel, VerificationStep};

proptest! {
    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// A deadline `secs` after `start` has passed exactly when `secs` have elapsed.
    #[test]
    fn deadline_passes_after_offset(start in 0u64..1_000_000, secs in 0u64..1_000_000, at in 0u64..2_000_000) {
        let deadline = Timestamp::new(start).plus_secs(secs);
        let now = Timestamp::new(at);
        prop_assert_eq!(deadline.has_passed(now), at >= start + secs);
    }

    /// Levels survive a trip through their string form in any casing.
    #[test]
    fn level_string_round_trip(idx in 0usize..5, upper in any::<bool>()) {
        let level = VerificationLevel::ALL[idx];
        let s = if upper { level.as_str().to_uppercase() } else { level.as_str().to_string() };
        prop_assert_eq!(s.parse::<VerificationLevel>().unwrap(), level);
    }

    /// Session ids survive JSON unchanged.
    #[test]
    fn session_id_json_is_transparent(raw in "[a-z0-9_]{1,32}") {
        let id = SessionId::new(raw.clone());
        let json = serde_json::to_string(&id).unwrap();
        prop_assert_eq!(json, format!("\"{raw}\""));
    }
}

#[test]
fn new_steps_start_unstarted_with_empty_metadata() {
    let step = VerificationStep::new(StepType::LivenessCheck, true, 4);
    assert_eq!(step.order, 4);
    assert!(step.metadata.is_empty());
    assert!(step.completed_at.is_none());
}

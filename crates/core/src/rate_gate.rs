//! The one-complaint-per-hour submission rule.
//!
//! This module only decides; it does not read or write anything. The caller
//! supplies the owner's most recent `created_at` and the current time. The
//! check is read-then-decide: two concurrent submissions from the same owner
//! can both be allowed before either is stored.

use chrono::TimeDelta;

use crate::types::Timestamp;

/// Minimum spacing between two complaints from the same owner, in seconds.
pub const SUBMISSION_INTERVAL_SECS: i64 = 60 * 60;

/// Outcome of a rate-gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionDecision {
    Allowed,
    Denied { next_allowed_at: Timestamp },
}

impl SubmissionDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// The submission interval as a [`TimeDelta`].
pub fn submission_interval() -> TimeDelta {
    TimeDelta::seconds(SUBMISSION_INTERVAL_SECS)
}

/// Earliest instant the owner may submit again, or `None` if they never have.
pub fn next_allowed_at(last_created_at: Option<Timestamp>) -> Option<Timestamp> {
    last_created_at.map(|last| last + submission_interval())
}

/// Decide whether an owner whose last complaint was created at
/// `last_created_at` may submit at `now`.
///
/// Allowed iff there is no previous complaint or `now - last >= 1 hour`.
pub fn evaluate(last_created_at: Option<Timestamp>, now: Timestamp) -> SubmissionDecision {
    match next_allowed_at(last_created_at) {
        Some(next) if now < next => SubmissionDecision::Denied {
            next_allowed_at: next,
        },
        _ => SubmissionDecision::Allowed,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, h, m, s)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn first_submission_is_allowed() {
        assert_eq!(evaluate(None, at(9, 0, 0)), SubmissionDecision::Allowed);
        assert_eq!(next_allowed_at(None), None);
    }

    #[test]
    fn denied_within_the_hour() {
        let last = at(9, 0, 0);
        for now in [at(9, 0, 0), at(9, 1, 0), at(9, 59, 59)] {
            assert_eq!(
                evaluate(Some(last), now),
                SubmissionDecision::Denied {
                    next_allowed_at: at(10, 0, 0)
                },
                "now = {now}"
            );
        }
    }

    #[test]
    fn allowed_at_exactly_one_hour() {
        assert!(evaluate(Some(at(9, 0, 0)), at(10, 0, 0)).is_allowed());
    }

    #[test]
    fn allowed_after_sixty_one_minutes() {
        assert!(evaluate(Some(at(9, 0, 0)), at(10, 1, 0)).is_allowed());
    }

    #[test]
    fn last_created_in_the_future_is_denied() {
        // Clock skew between writers must not open the gate early.
        let decision = evaluate(Some(at(11, 0, 0)), at(10, 30, 0));
        assert!(!decision.is_allowed());
    }
}

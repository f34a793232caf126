//! The application status state machine.
//!
//! Every application moves through a directed, no-skipping transition
//! graph:
//!
//! ```text
//!         submit
//!   (start) -----> pending
//!   pending --review--> under_review
//!   under_review --approve--> approved
//!   under_review --reject--> rejected  [terminal]
//!   approved --complete--> completed   [terminal]
//! ```
//!
//! Self-transitions are never legal, and terminal statuses have no
//! outgoing edges. The table here is the single source of truth; the
//! lifecycle controller consults it before committing any change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an application record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Submitted, awaiting review.
    Pending,
    /// Picked up by staff for review.
    UnderReview,
    /// Approved, awaiting completion (fee payment, certificate issue).
    Approved,
    /// Rejected. Terminal.
    Rejected,
    /// Fulfilled. Terminal.
    Completed,
}

impl ApplicationStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::UnderReview,
        Self::Approved,
        Self::Rejected,
        Self::Completed,
    ];

    /// Statuses legally reachable from this one in a single transition.
    #[must_use]
    pub const fn successors(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::UnderReview],
            Self::UnderReview => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Completed],
            Self::Rejected | Self::Completed => &[],
        }
    }

    /// Whether `next` is legally reachable from this status.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.successors().contains(&next)
    }

    /// Whether this status has no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Wire representation (snake_case), matching the serde encoding.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "under_review" => Ok(Self::UnderReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized status string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status: {0}")]
pub struct UnknownStatus(pub String);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn legal_edges_match_the_table() {
        use ApplicationStatus::{Approved, Completed, Pending, Rejected, UnderReview};

        let legal = [
            (Pending, UnderReview),
            (UnderReview, Approved),
            (UnderReview, Rejected),
            (Approved, Completed),
        ];

        for from in ApplicationStatus::ALL {
            for to in ApplicationStatus::ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{from} -> {to} should be {expected}"
                );
            }
        }
    }

    #[test]
    fn terminal_statuses_have_no_successors() {
        assert!(ApplicationStatus::Rejected.is_terminal());
        assert!(ApplicationStatus::Completed.is_terminal());
        assert!(ApplicationStatus::Rejected.successors().is_empty());
        assert!(ApplicationStatus::Completed.successors().is_empty());
    }

    #[test]
    fn wire_names_round_trip() {
        for status in ApplicationStatus::ALL {
            assert_eq!(
                status.wire_name().parse::<ApplicationStatus>().unwrap(),
                status
            );
        }
        assert!("in_progress".parse::<ApplicationStatus>().is_err());
    }

    fn any_status() -> impl Strategy<Value = ApplicationStatus> {
        prop::sample::select(ApplicationStatus::ALL.to_vec())
    }

    proptest! {
        /// Self-transitions are never legal and terminal statuses never
        /// have outgoing edges, for every status pair.
        #[test]
        fn no_self_edges_and_terminals_are_sinks(from in any_status(), to in any_status()) {
            prop_assert!(!from.can_transition_to(from));
            if from.is_terminal() {
                prop_assert!(!from.can_transition_to(to));
            }
            // every legal edge appears in the successor list exactly once
            if from.can_transition_to(to) {
                prop_assert_eq!(from.successors().iter().filter(|s| **s == to).count(), 1);
            }
        }
    }
}

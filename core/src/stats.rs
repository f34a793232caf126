//! Statistics over the application record set.
//!
//! Snapshots are derived, never authoritative: each one is a pure
//! function of the records passed in, so the aggregate layer can
//! recompute from scratch whenever the record set changes and can never
//! drift from the truth (the stored-counter failure mode this replaces).

use crate::status::ApplicationStatus;
use crate::types::ApplicationRecord;
use serde::Serialize;

/// System-wide aggregate snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SystemStatistics {
    /// Number of services in the catalog.
    pub total_services: usize,
    /// Applications that reached `completed`.
    pub applications_processed: usize,
    /// Mean days from submission to completion over completed records
    /// with both timestamps, rounded to one decimal. `0` when there are
    /// none.
    pub average_processing_days: f64,
}

/// Per-user aggregate snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserStatistics {
    /// All applications the user has submitted.
    pub total_applications: usize,
    /// Applications still in `pending`.
    pub pending_applications: usize,
    /// Applications that reached `completed`.
    pub completed_applications: usize,
    /// Sum of fees over the user's completed applications, in whole
    /// rupees (rounded per amount).
    pub total_amount_paid: u64,
}

/// Computes the system-wide snapshot from the full record set.
#[must_use]
pub fn system_statistics(records: &[ApplicationRecord], total_services: usize) -> SystemStatistics {
    let processed = records
        .iter()
        .filter(|r| r.status == ApplicationStatus::Completed)
        .count();

    SystemStatistics {
        total_services,
        applications_processed: processed,
        average_processing_days: average_processing_days(records),
    }
}

/// Computes one user's snapshot from the full record set.
#[must_use]
pub fn user_statistics(records: &[ApplicationRecord], user: crate::types::UserId) -> UserStatistics {
    let mut stats = UserStatistics::default();
    for record in records.iter().filter(|r| r.applicant == user) {
        stats.total_applications += 1;
        match record.status {
            ApplicationStatus::Pending => stats.pending_applications += 1,
            ApplicationStatus::Completed => {
                stats.completed_applications += 1;
                if let Some(fee) = record.fee_amount {
                    stats.total_amount_paid += fee.rupees();
                }
            }
            ApplicationStatus::UnderReview
            | ApplicationStatus::Approved
            | ApplicationStatus::Rejected => {}
        }
    }
    stats
}

/// Mean submission-to-completion time in days, rounded to one decimal.
///
/// Only completed records carrying both a submission and a completion
/// timestamp in their history participate; an empty set yields `0`.
#[must_use]
pub fn average_processing_days(records: &[ApplicationRecord]) -> f64 {
    let durations: Vec<f64> = records
        .iter()
        .filter(|r| r.status == ApplicationStatus::Completed)
        .filter_map(|r| {
            let submitted = r.submitted_at()?;
            let completed = r.completed_at()?;
            let seconds = (completed - submitted).num_seconds();
            #[allow(clippy::cast_precision_loss)] // durations are far below 2^52 seconds
            Some(seconds as f64 / 86_400.0)
        })
        .collect();

    if durations.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;
    (mean * 10.0).round() / 10.0
}

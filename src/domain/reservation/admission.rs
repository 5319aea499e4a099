//! Reservation admission rule
//!
//! A station with `N` spaces may never have more than `N` reservations
//! covering the same instant. Admission is decided per request from a fresh
//! overlap count; nothing here keeps state between decisions.
//!
//! Intervals are closed: `[10:00, 12:00]` and `[12:00, 14:00]` share the
//! instant 12:00 and therefore compete for the same space.

use chrono::{DateTime, Utc};

use crate::shared::{DomainError, DomainResult};

/// Closed time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// Builds an interval, rejecting `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if start >= end {
            return Err(DomainError::Validation(
                "startReservation must be before endReservation".into(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Inclusive overlap: touching boundaries count.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Admit,
    Reject { overlapping: u64, capacity: i32 },
}

impl AdmissionDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionDecision::Admit)
    }
}

/// Decides whether one more reservation fits next to `overlapping` existing
/// ones. `None` capacity admits everything; a non-positive capacity admits
/// nothing.
pub fn can_admit(capacity: Option<i32>, overlapping: u64) -> AdmissionDecision {
    let Some(capacity) = capacity else {
        return AdmissionDecision::Admit;
    };

    if capacity <= 0 || overlapping >= capacity as u64 {
        AdmissionDecision::Reject {
            overlapping,
            capacity,
        }
    } else {
        AdmissionDecision::Admit
    }
}

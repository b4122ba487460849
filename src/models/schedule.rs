//! Schedule models (future pickup requests)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Schedule status, stored as a smallint
///
/// `Pending` is the only non-terminal state: a schedule goes
/// pending → canceled or pending → finished, and never moves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum ScheduleStatus {
    Pending = 0,
    Canceled = 1,
    Finished = 2,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Pending => "pending",
            ScheduleStatus::Canceled => "canceled",
            ScheduleStatus::Finished => "finished",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScheduleStatus::Pending)
    }

    /// Transition table: only pending → canceled and pending → finished
    pub fn can_transition_to(&self, next: ScheduleStatus) -> bool {
        matches!(
            (self, next),
            (ScheduleStatus::Pending, ScheduleStatus::Canceled)
                | (ScheduleStatus::Pending, ScheduleStatus::Finished)
        )
    }
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Schedule aggregate root from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Schedule {
    pub id: i32,
    pub user_id: i32,
    pub pickup_date: DateTime<Utc>,
    pub status: ScheduleStatus,
    pub crea_date: DateTime<Utc>,
}

/// A single requested item within a schedule, immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduleLine {
    pub id: i32,
    pub schedule_id: i32,
    pub book_id: i32,
    /// Title snapshot taken at booking time
    pub book_title: String,
}

/// Schedule with its lines
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleDetails {
    pub id: i32,
    pub user_id: i32,
    pub pickup_date: DateTime<Utc>,
    pub status: ScheduleStatus,
    pub crea_date: DateTime<Utc>,
    pub lines: Vec<ScheduleLine>,
}

impl ScheduleDetails {
    pub fn contains_book(&self, book_id: i32) -> bool {
        self.lines.iter().any(|l| l.book_id == book_id)
    }
}

/// Create schedule request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSchedule {
    /// Defaults to the authenticated user; admins may book on behalf
    pub user_id: Option<i32>,
    #[validate(length(min = 1, message = "At least one book is required"))]
    pub book_ids: Vec<i32>,
    /// Requested pickup date
    pub pickup_date: DateTime<Utc>,
}

/// Status change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeScheduleStatus {
    pub status: ScheduleStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_cancel_and_finish() {
        assert!(ScheduleStatus::Pending.can_transition_to(ScheduleStatus::Canceled));
        assert!(ScheduleStatus::Pending.can_transition_to(ScheduleStatus::Finished));
    }

    #[test]
    fn test_terminal_states_never_move() {
        for from in [ScheduleStatus::Canceled, ScheduleStatus::Finished] {
            for to in [
                ScheduleStatus::Pending,
                ScheduleStatus::Canceled,
                ScheduleStatus::Finished,
            ] {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be rejected");
            }
        }
    }

    #[test]
    fn test_pending_cannot_stay_pending() {
        assert!(!ScheduleStatus::Pending.can_transition_to(ScheduleStatus::Pending));
    }

    #[test]
    fn test_terminality() {
        assert!(!ScheduleStatus::Pending.is_terminal());
        assert!(ScheduleStatus::Canceled.is_terminal());
        assert!(ScheduleStatus::Finished.is_terminal());
    }
}

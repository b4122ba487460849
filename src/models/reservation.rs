//! Reservation models (active loans)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Reservation aggregate root from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: i32,
    pub user_id: i32,
    pub crea_date: DateTime<Utc>,
}

/// A single borrowed item within a reservation
///
/// `book_title` is a snapshot taken at creation time; renaming the book
/// later does not rewrite historical lines.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReservationLine {
    pub id: i32,
    pub reservation_id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub expiration_date: DateTime<Utc>,
    /// A line can be extended at most once; this flag never goes back to false
    pub already_extended: bool,
    pub returned: bool,
    pub returned_date: Option<DateTime<Utc>>,
}

impl ReservationLine {
    /// An unreturned line whose expiration date has passed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.returned && self.expiration_date < now
    }
}

/// Reservation with its lines
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationDetails {
    pub id: i32,
    pub user_id: i32,
    pub crea_date: DateTime<Utc>,
    pub lines: Vec<ReservationLine>,
}

/// Line data for a reservation about to be persisted
#[derive(Debug, Clone)]
pub struct NewReservationLine {
    pub book_id: i32,
    pub book_title: String,
    pub expiration_date: DateTime<Utc>,
}

/// Create reservation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservation {
    /// Defaults to the authenticated user; admins may reserve on behalf
    pub user_id: Option<i32>,
    #[validate(length(min = 1, message = "At least one book is required"))]
    pub book_ids: Vec<i32>,
}

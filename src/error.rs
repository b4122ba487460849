//! Error types for Biblioflow server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes carried in every error response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchBook = 5,
    BookNotAvailable = 6,
    Duplicate = 7,
    ReserveLimitReached = 8,
    InsufficientStock = 9,
    OverdueItems = 10,
    ScheduleDeadline = 11,
    DuplicateSchedule = 12,
    AlreadyExtended = 13,
    AllItemsReturned = 14,
    CantChangeStatus = 15,
    BadValue = 16,
    NoSuchData = 17,
    UserHasBorrowedItems = 18,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// One or more requested books have no loanable copy left
    #[error("Books not available: {}", .0.join(", "))]
    BookNotAvailable(Vec<String>),

    /// The patron already holds too many unreturned items
    #[error("Reserve limit exceeded: {held} item(s) currently held, cap is {cap}")]
    ReserveLimitExceeded { held: i64, cap: i64 },

    /// A stock mutation would drive `available` below 0 or above `quantity`
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i32, available: i32 },

    /// The patron has an unreturned item whose expiration date has passed
    #[error("Overdue items block this action")]
    OverdueItems,

    /// Requested pickup date is in the past, beyond the booking window,
    /// or falls on a closing day
    #[error("Schedule deadline exceeded: {0}")]
    ScheduleDeadlineExceeded(String),

    /// The same book was already scheduled too often in the recent window
    #[error("Duplicate schedule limit exceeded for: {}", .0.join(", "))]
    DuplicateScheduleLimitExceeded(Vec<String>),

    /// A reservation line can only be extended once
    #[error("Reservation already extended")]
    AlreadyExtended,

    /// Every targeted line is already returned
    #[error("All items already returned")]
    AllItemsAlreadyReturned,

    /// Schedule status can only change out of the pending state
    #[error("Cannot change schedule status: {0}")]
    CantChangeStatus(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) | AppError::Authorization(_) => ErrorCode::NotAuthorized,
            AppError::NotFound(_) => ErrorCode::NoSuchData,
            AppError::Validation(_) | AppError::BadRequest(_) => ErrorCode::BadValue,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::Internal(_) => ErrorCode::Failure,
            AppError::BookNotAvailable(_) => ErrorCode::BookNotAvailable,
            AppError::ReserveLimitExceeded { .. } => ErrorCode::ReserveLimitReached,
            AppError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            AppError::OverdueItems => ErrorCode::OverdueItems,
            AppError::ScheduleDeadlineExceeded(_) => ErrorCode::ScheduleDeadline,
            AppError::DuplicateScheduleLimitExceeded(_) => ErrorCode::DuplicateSchedule,
            AppError::AlreadyExtended => ErrorCode::AlreadyExtended,
            AppError::AllItemsAlreadyReturned => ErrorCode::AllItemsReturned,
            AppError::CantChangeStatus(_) => ErrorCode::CantChangeStatus,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::BookNotAvailable(_)
            | AppError::ReserveLimitExceeded { .. }
            | AppError::InsufficientStock { .. }
            | AppError::OverdueItems
            | AppError::ScheduleDeadlineExceeded(_)
            | AppError::DuplicateScheduleLimitExceeded(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::AlreadyExtended
            | AppError::AllItemsAlreadyReturned
            | AppError::CantChangeStatus(_) => (StatusCode::CONFLICT, self.to_string()),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

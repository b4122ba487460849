//! Data models for Biblioflow

pub mod book;
pub mod reservation;
pub mod schedule;
pub mod user;

// Re-export commonly used types
pub use book::{Author, Book, Publisher};
pub use reservation::{Reservation, ReservationDetails, ReservationLine};
pub use schedule::{Schedule, ScheduleDetails, ScheduleLine, ScheduleStatus};
pub use user::{Role, User, UserClaims};

//! Repository layer for database operations

pub mod books;
pub mod reservations;
pub mod schedules;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub reservations: reservations::ReservationsRepository,
    pub schedules: schedules::SchedulesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            schedules: schedules::SchedulesRepository::new(pool.clone()),
            pool,
        }
    }
}

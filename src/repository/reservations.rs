//! Reservations repository for database operations
//!
//! Writes that must be atomic with stock mutations take a caller-owned
//! connection; reads go through the pool.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::reservation::{NewReservationLine, Reservation, ReservationDetails, ReservationLine},
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// Get reservation with its lines
    pub async fn details(&self, id: i32) -> AppResult<ReservationDetails> {
        let reservation = self.get_by_id(id).await?;
        let lines = self.lines_for_reservation(id).await?;
        Ok(ReservationDetails {
            id: reservation.id,
            user_id: reservation.user_id,
            crea_date: reservation.crea_date,
            lines,
        })
    }

    /// Lines of one reservation, in creation order
    pub async fn lines_for_reservation(&self, reservation_id: i32) -> AppResult<Vec<ReservationLine>> {
        let lines = sqlx::query_as::<_, ReservationLine>(
            "SELECT * FROM reservation_lines WHERE reservation_id = $1 ORDER BY id",
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    /// Get a single line by ID
    pub async fn get_line(&self, line_id: i32) -> AppResult<ReservationLine> {
        sqlx::query_as::<_, ReservationLine>("SELECT * FROM reservation_lines WHERE id = $1")
            .bind(line_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Reservation line with id {} not found", line_id))
            })
    }

    /// All lines of a user across every reservation
    pub async fn lines_for_user(&self, user_id: i32) -> AppResult<Vec<ReservationLine>> {
        let lines = sqlx::query_as::<_, ReservationLine>(
            r#"
            SELECT rl.*
            FROM reservation_lines rl
            JOIN reservations r ON rl.reservation_id = r.id
            WHERE r.user_id = $1
            ORDER BY rl.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    /// Count a user's unreturned lines across every reservation
    pub async fn count_unreturned_for_user(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM reservation_lines rl
            JOIN reservations r ON rl.reservation_id = r.id
            WHERE r.user_id = $1 AND rl.returned = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Same count on a caller-owned connection, for re-checking the holding
    /// limit under a user row lock
    pub async fn count_unreturned_on(
        &self,
        conn: &mut PgConnection,
        user_id: i32,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM reservation_lines rl
            JOIN reservations r ON rl.reservation_id = r.id
            WHERE r.user_id = $1 AND rl.returned = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(conn)
        .await?;
        Ok(count)
    }

    /// List a user's reservations with their lines
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<ReservationDetails>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE user_id = $1 ORDER BY crea_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            let lines = self.lines_for_reservation(reservation.id).await?;
            result.push(ReservationDetails {
                id: reservation.id,
                user_id: reservation.user_id,
                crea_date: reservation.crea_date,
                lines,
            });
        }
        Ok(result)
    }

    /// Insert a reservation and its lines, returning the new ID
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        user_id: i32,
        lines: &[NewReservationLine],
    ) -> AppResult<i32> {
        let reservation_id: i32 = sqlx::query_scalar(
            "INSERT INTO reservations (user_id) VALUES ($1) RETURNING id",
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO reservation_lines
                    (reservation_id, book_id, book_title, expiration_date, already_extended, returned)
                VALUES ($1, $2, $3, $4, FALSE, FALSE)
                "#,
            )
            .bind(reservation_id)
            .bind(line.book_id)
            .bind(&line.book_title)
            .bind(line.expiration_date)
            .execute(&mut *conn)
            .await?;
        }

        Ok(reservation_id)
    }

    /// Extend every line of a reservation in one statement
    ///
    /// Only lines not yet extended move; the returned count lets the caller
    /// detect a concurrent extension that won the race and roll back.
    pub async fn extend_all_lines(
        &self,
        conn: &mut PgConnection,
        reservation_id: i32,
        days: i32,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE reservation_lines
            SET expiration_date = expiration_date + make_interval(days => $2),
                already_extended = TRUE
            WHERE reservation_id = $1 AND already_extended = FALSE
            "#,
        )
        .bind(reservation_id)
        .bind(days)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark one line returned
    pub async fn mark_line_returned(
        &self,
        conn: &mut PgConnection,
        line_id: i32,
        returned_date: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE reservation_lines SET returned = TRUE, returned_date = $2 WHERE id = $1",
        )
        .bind(line_id)
        .bind(returned_date)
        .execute(conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Reservation line with id {} not found",
                line_id
            )));
        }
        Ok(())
    }

    /// Delete a reservation; lines cascade
    pub async fn delete(&self, conn: &mut PgConnection, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Reservation with id {} not found",
                id
            )));
        }
        Ok(())
    }
}

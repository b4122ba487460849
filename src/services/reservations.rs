//! Reservation lifecycle service
//!
//! Each use case runs its guards against freshly loaded aggregates before
//! any write, then performs all writes inside a single transaction.

use chrono::Utc;

use crate::{
    domain::reservation_rules::{
        self, check_availability, check_distinct_books, check_holding_limit, check_no_overdue,
        unreturned_lines, validate_extension, validate_line_return, LOAN_PERIOD_DAYS,
    },
    error::{AppError, AppResult},
    models::{
        reservation::{NewReservationLine, ReservationDetails},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
}

impl ReservationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List a user's reservations
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<ReservationDetails>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.reservations.list_for_user(user_id).await
    }

    /// Create a reservation: one line per book, 30-day expiration each
    pub async fn create_reservation(
        &self,
        user_id: i32,
        book_ids: &[i32],
    ) -> AppResult<ReservationDetails> {
        let now = Utc::now();

        check_distinct_books(book_ids)?;

        let user = self.repository.users.get_by_id(user_id).await?;

        // All requested books must resolve; partial matches are rejected wholesale
        let books = self.repository.books.get_many(book_ids).await?;
        if books.len() != book_ids.len() {
            return Err(AppError::NotFound(
                "One or more requested books do not exist".to_string(),
            ));
        }

        check_availability(&books)?;

        let held = self
            .repository
            .reservations
            .count_unreturned_for_user(user.id)
            .await?;
        check_holding_limit(held, books.len())?;

        // A patron with any overdue item cannot take more
        let existing_lines = self.repository.reservations.lines_for_user(user.id).await?;
        check_no_overdue(&existing_lines, now)?;

        let expiration = reservation_rules::initial_expiration(now);
        let lines: Vec<NewReservationLine> = books
            .iter()
            .map(|book| NewReservationLine {
                book_id: book.id,
                book_title: book.title.clone(),
                expiration_date: expiration,
            })
            .collect();

        let mut tx = self.repository.pool.begin().await?;
        // Re-check the quota under the user row lock: a concurrent request
        // for the same patron commits or rolls back before this count runs
        self.repository.users.lock_row(&mut tx, user.id).await?;
        let held = self
            .repository
            .reservations
            .count_unreturned_on(&mut tx, user.id)
            .await?;
        check_holding_limit(held, books.len())?;
        let reservation_id = self
            .repository
            .reservations
            .create(&mut tx, user.id, &lines)
            .await?;
        for book in &books {
            self.repository.books.checkout_copies(&mut tx, book.id, 1).await?;
        }
        tx.commit().await?;

        tracing::info!(reservation_id, user_id = user.id, "Reservation created");
        self.repository.reservations.details(reservation_id).await
    }

    /// Extend every line of a reservation by 30 days, at most once
    pub async fn extend_reservation(
        &self,
        reservation_id: i32,
        claims: &UserClaims,
    ) -> AppResult<ReservationDetails> {
        let now = Utc::now();

        let reservation = self.repository.reservations.get_by_id(reservation_id).await?;
        claims.require_self_or_admin(reservation.user_id)?;

        let patron_lines = self
            .repository
            .reservations
            .lines_for_user(reservation.user_id)
            .await?;
        let reservation_lines = self
            .repository
            .reservations
            .lines_for_reservation(reservation_id)
            .await?;

        // Everything is validated before the first write so a rejected
        // extension leaves no line partially moved
        validate_extension(&patron_lines, &reservation_lines, now)?;

        let mut tx = self.repository.pool.begin().await?;
        let moved = self
            .repository
            .reservations
            .extend_all_lines(&mut tx, reservation_id, LOAN_PERIOD_DAYS as i32)
            .await?;
        // A concurrent extension that committed between the validation above
        // and this update leaves some lines untouched; roll back and report
        if moved != reservation_lines.len() as u64 {
            return Err(AppError::AlreadyExtended);
        }
        tx.commit().await?;

        tracing::info!(reservation_id, "Reservation extended");
        self.repository.reservations.details(reservation_id).await
    }

    /// Return a single line and put its copy back on the shelf
    pub async fn return_line(&self, line_id: i32, claims: &UserClaims) -> AppResult<()> {
        let now = Utc::now();

        let line = self.repository.reservations.get_line(line_id).await?;
        let reservation = self
            .repository
            .reservations
            .get_by_id(line.reservation_id)
            .await?;
        claims.require_self_or_admin(reservation.user_id)?;

        validate_line_return(&line)?;

        let mut tx = self.repository.pool.begin().await?;
        self.repository
            .reservations
            .mark_line_returned(&mut tx, line.id, now)
            .await?;
        self.repository
            .books
            .shelf_return_copies(&mut tx, line.book_id, 1)
            .await?;
        tx.commit().await?;

        tracing::info!(line_id, "Reservation line returned");
        Ok(())
    }

    /// Return every unreturned line of a reservation
    pub async fn return_reservation(
        &self,
        reservation_id: i32,
        claims: &UserClaims,
    ) -> AppResult<ReservationDetails> {
        let now = Utc::now();

        let reservation = self.repository.reservations.get_by_id(reservation_id).await?;
        claims.require_self_or_admin(reservation.user_id)?;

        let lines = self
            .repository
            .reservations
            .lines_for_reservation(reservation_id)
            .await?;
        let open = unreturned_lines(&lines)?;

        let mut tx = self.repository.pool.begin().await?;
        for line in open {
            self.repository
                .reservations
                .mark_line_returned(&mut tx, line.id, now)
                .await?;
            self.repository
                .books
                .shelf_return_copies(&mut tx, line.book_id, 1)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(reservation_id, "Reservation fully returned");
        self.repository.reservations.details(reservation_id).await
    }

    /// Administrative deletion of a reservation
    ///
    /// Stock is restored for unreturned lines only; returned lines already
    /// put their copy back on the shelf.
    pub async fn delete_reservation(&self, reservation_id: i32) -> AppResult<()> {
        self.repository.reservations.get_by_id(reservation_id).await?;
        let lines = self
            .repository
            .reservations
            .lines_for_reservation(reservation_id)
            .await?;

        let mut tx = self.repository.pool.begin().await?;
        for line in lines.iter().filter(|l| !l.returned) {
            self.repository
                .books
                .shelf_return_copies(&mut tx, line.book_id, 1)
                .await?;
        }
        self.repository.reservations.delete(&mut tx, reservation_id).await?;
        tx.commit().await?;

        tracing::info!(reservation_id, "Reservation deleted");
        Ok(())
    }
}

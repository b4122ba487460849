//! Schedule service: future pickups and their status machine

use chrono::Utc;

use crate::{
    domain::{
        reservation_rules::{
            self, check_availability, check_distinct_books, check_holding_limit,
        },
        schedule_rules::{check_duplicate_bookings, duplicate_window_start, validate_pickup_date},
    },
    error::{AppError, AppResult},
    models::{
        reservation::NewReservationLine,
        schedule::{ScheduleDetails, ScheduleStatus},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SchedulesService {
    repository: Repository,
}

impl SchedulesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List a user's schedules
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<ScheduleDetails>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.schedules.list_for_user(user_id).await
    }

    /// Book a future pickup
    ///
    /// Stock is decremented immediately: the copy is held for the patron
    /// even though the pickup lies in the future.
    pub async fn create_schedule(
        &self,
        user_id: i32,
        book_ids: &[i32],
        pickup_date: chrono::DateTime<Utc>,
    ) -> AppResult<ScheduleDetails> {
        let now = Utc::now();

        check_distinct_books(book_ids)?;

        let user = self.repository.users.get_by_id(user_id).await?;

        let books = self.repository.books.get_many(book_ids).await?;
        if books.len() != book_ids.len() {
            return Err(AppError::NotFound(
                "One or more requested books do not exist".to_string(),
            ));
        }

        check_availability(&books)?;
        validate_pickup_date(now, pickup_date)?;

        let held = self
            .repository
            .reservations
            .count_unreturned_for_user(user.id)
            .await?;
        check_holding_limit(held, books.len())?;

        let recent = self
            .repository
            .schedules
            .list_for_user_since(user.id, duplicate_window_start(now))
            .await?;
        check_duplicate_bookings(&recent, &books)?;

        let lines: Vec<(i32, String)> = books
            .iter()
            .map(|book| (book.id, book.title.clone()))
            .collect();

        let mut tx = self.repository.pool.begin().await?;
        // Re-check the quota under the user row lock, same as reservations
        self.repository.users.lock_row(&mut tx, user.id).await?;
        let held = self
            .repository
            .reservations
            .count_unreturned_on(&mut tx, user.id)
            .await?;
        check_holding_limit(held, books.len())?;
        for book in &books {
            self.repository.books.checkout_copies(&mut tx, book.id, 1).await?;
        }
        let schedule_id = self
            .repository
            .schedules
            .create(&mut tx, user.id, pickup_date, &lines)
            .await?;
        tx.commit().await?;

        tracing::info!(schedule_id, user_id = user.id, "Schedule created");
        self.repository.schedules.details(schedule_id).await
    }

    /// Drive a pending schedule to a terminal state
    ///
    /// Cancellation puts every held copy back on the shelf. Finishing turns
    /// the schedule into a live reservation; the copies stay checked out,
    /// they were already taken off the shelf at booking time.
    pub async fn change_status(
        &self,
        schedule_id: i32,
        target: ScheduleStatus,
        claims: &UserClaims,
    ) -> AppResult<ScheduleDetails> {
        let now = Utc::now();

        let schedule = self.repository.schedules.details(schedule_id).await?;
        claims.require_self_or_admin(schedule.user_id)?;

        if !schedule.status.can_transition_to(target) {
            return Err(AppError::CantChangeStatus(format!(
                "No transition from {} to {}",
                schedule.status, target
            )));
        }

        let mut tx = self.repository.pool.begin().await?;
        match target {
            ScheduleStatus::Canceled => {
                // the copies were never picked up
                for line in &schedule.lines {
                    self.repository
                        .books
                        .shelf_return_copies(&mut tx, line.book_id, 1)
                        .await?;
                }
            }
            ScheduleStatus::Finished => {
                let expiration = reservation_rules::initial_expiration(now);
                let lines: Vec<NewReservationLine> = schedule
                    .lines
                    .iter()
                    .map(|line| NewReservationLine {
                        book_id: line.book_id,
                        book_title: line.book_title.clone(),
                        expiration_date: expiration,
                    })
                    .collect();
                let reservation_id = self
                    .repository
                    .reservations
                    .create(&mut tx, schedule.user_id, &lines)
                    .await?;
                tracing::info!(schedule_id, reservation_id, "Schedule converted to reservation");
            }
            ScheduleStatus::Pending => unreachable!("pending is never a transition target"),
        }
        self.repository
            .schedules
            .update_status(&mut tx, schedule_id, target)
            .await?;
        tx.commit().await?;

        tracing::info!(schedule_id, status = %target, "Schedule status changed");
        self.repository.schedules.details(schedule_id).await
    }
}

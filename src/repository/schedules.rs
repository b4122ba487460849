//! Schedules repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::schedule::{Schedule, ScheduleDetails, ScheduleLine, ScheduleStatus},
};

#[derive(Clone)]
pub struct SchedulesRepository {
    pool: Pool<Postgres>,
}

impl SchedulesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get schedule by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Schedule> {
        sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Schedule with id {} not found", id)))
    }

    /// Get schedule with its lines
    pub async fn details(&self, id: i32) -> AppResult<ScheduleDetails> {
        let schedule = self.get_by_id(id).await?;
        let lines = self.lines_for_schedule(id).await?;
        Ok(Self::with_lines(schedule, lines))
    }

    fn with_lines(schedule: Schedule, lines: Vec<ScheduleLine>) -> ScheduleDetails {
        ScheduleDetails {
            id: schedule.id,
            user_id: schedule.user_id,
            pickup_date: schedule.pickup_date,
            status: schedule.status,
            crea_date: schedule.crea_date,
            lines,
        }
    }

    /// Lines of one schedule, in creation order
    pub async fn lines_for_schedule(&self, schedule_id: i32) -> AppResult<Vec<ScheduleLine>> {
        let lines = sqlx::query_as::<_, ScheduleLine>(
            "SELECT * FROM schedule_lines WHERE schedule_id = $1 ORDER BY id",
        )
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    /// List a user's schedules with their lines
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<ScheduleDetails>> {
        let schedules = sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE user_id = $1 ORDER BY crea_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_lines(schedules).await
    }

    /// Schedules of a user created on or after `since`, any status
    pub async fn list_for_user_since(
        &self,
        user_id: i32,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<ScheduleDetails>> {
        let schedules = sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE user_id = $1 AND crea_date >= $2 ORDER BY crea_date DESC",
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        self.attach_lines(schedules).await
    }

    async fn attach_lines(&self, schedules: Vec<Schedule>) -> AppResult<Vec<ScheduleDetails>> {
        let mut result = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            let lines = self.lines_for_schedule(schedule.id).await?;
            result.push(Self::with_lines(schedule, lines));
        }
        Ok(result)
    }

    /// Insert a pending schedule and its lines, returning the new ID
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        user_id: i32,
        pickup_date: DateTime<Utc>,
        lines: &[(i32, String)],
    ) -> AppResult<i32> {
        let schedule_id: i32 = sqlx::query_scalar(
            "INSERT INTO schedules (user_id, pickup_date, status) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(pickup_date)
        .bind(ScheduleStatus::Pending)
        .fetch_one(&mut *conn)
        .await?;

        for (book_id, book_title) in lines {
            sqlx::query(
                "INSERT INTO schedule_lines (schedule_id, book_id, book_title) VALUES ($1, $2, $3)",
            )
            .bind(schedule_id)
            .bind(book_id)
            .bind(book_title)
            .execute(&mut *conn)
            .await?;
        }

        Ok(schedule_id)
    }

    /// Persist a status transition
    pub async fn update_status(
        &self,
        conn: &mut PgConnection,
        id: i32,
        status: ScheduleStatus,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE schedules SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Schedule with id {} not found",
                id
            )));
        }
        Ok(())
    }
}

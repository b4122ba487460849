//! Schedule endpoints (future pickups)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::schedule::{ChangeScheduleStatus, CreateSchedule, ScheduleDetails},
    AppState,
};

use super::AuthenticatedUser;

/// List a user's schedules
#[utoipa::path(
    get,
    path = "/users/{id}/schedules",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's schedules", body = Vec<ScheduleDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_user_schedules(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<ScheduleDetails>>> {
    claims.require_self_or_admin(user_id)?;

    let schedules = state.services.schedules.list_for_user(user_id).await?;
    Ok(Json(schedules))
}

/// Book a future pickup
#[utoipa::path(
    post,
    path = "/schedules",
    tag = "schedules",
    security(("bearer_auth" = [])),
    request_body = CreateSchedule,
    responses(
        (status = 201, description = "Schedule created", body = ScheduleDetails),
        (status = 404, description = "User or book not found"),
        (status = 422, description = "Illegal pickup date, limit reached or duplicate booking")
    )
)]
pub async fn create_schedule(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateSchedule>,
) -> AppResult<(StatusCode, Json<ScheduleDetails>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_id = request.user_id.unwrap_or(claims.user_id);
    claims.require_self_or_admin(user_id)?;

    let schedule = state
        .services
        .schedules
        .create_schedule(user_id, &request.book_ids, request.pickup_date)
        .await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// Cancel or finish a pending schedule
#[utoipa::path(
    post,
    path = "/schedules/{id}/status",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Schedule ID")
    ),
    request_body = ChangeScheduleStatus,
    responses(
        (status = 200, description = "Status changed", body = ScheduleDetails),
        (status = 404, description = "Schedule not found"),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Schedule is not pending")
    )
)]
pub async fn change_schedule_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(schedule_id): Path<i32>,
    Json(request): Json<ChangeScheduleStatus>,
) -> AppResult<Json<ScheduleDetails>> {
    let schedule = state
        .services
        .schedules
        .change_status(schedule_id, request.status, &claims)
        .await?;
    Ok(Json(schedule))
}

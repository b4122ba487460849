//! Reservation endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::reservation::{CreateReservation, ReservationDetails},
    AppState,
};

use super::AuthenticatedUser;

/// List a user's reservations
#[utoipa::path(
    get,
    path = "/users/{id}/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's reservations", body = Vec<ReservationDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_user_reservations(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<ReservationDetails>>> {
    claims.require_self_or_admin(user_id)?;

    let reservations = state.services.reservations.list_for_user(user_id).await?;
    Ok(Json(reservations))
}

/// Reserve one or more books
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created", body = ReservationDetails),
        (status = 404, description = "User or book not found"),
        (status = 422, description = "Books unavailable, limit reached or overdue items held")
    )
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<ReservationDetails>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_id = request.user_id.unwrap_or(claims.user_id);
    claims.require_self_or_admin(user_id)?;

    let reservation = state
        .services
        .reservations
        .create_reservation(user_id, &request.book_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Extend every line of a reservation by 30 days (one-time)
#[utoipa::path(
    post,
    path = "/reservations/{id}/extend",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation extended", body = ReservationDetails),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Already extended or everything returned"),
        (status = 422, description = "Overdue items block the extension")
    )
)]
pub async fn extend_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(reservation_id): Path<i32>,
) -> AppResult<Json<ReservationDetails>> {
    let reservation = state
        .services
        .reservations
        .extend_reservation(reservation_id, &claims)
        .await?;
    Ok(Json(reservation))
}

/// Return every unreturned line of a reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/return",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation returned", body = ReservationDetails),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Everything already returned")
    )
)]
pub async fn return_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(reservation_id): Path<i32>,
) -> AppResult<Json<ReservationDetails>> {
    let reservation = state
        .services
        .reservations
        .return_reservation(reservation_id, &claims)
        .await?;
    Ok(Json(reservation))
}

/// Return a single reservation line
#[utoipa::path(
    post,
    path = "/reservations/lines/{id}/return",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Reservation line ID")
    ),
    responses(
        (status = 204, description = "Line returned"),
        (status = 404, description = "Line not found"),
        (status = 409, description = "Line already returned")
    )
)]
pub async fn return_line(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(line_id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.reservations.return_line(line_id, &claims).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a reservation, restoring stock for unreturned lines
#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Reservation ID")
    ),
    responses(
        (status = 204, description = "Reservation deleted"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn delete_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(reservation_id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state
        .services
        .reservations
        .delete_reservation(reservation_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

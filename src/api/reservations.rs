//! Reservation workflow endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::reservation::{CreateReservation, ReservationDetails, ReservationQuery},
};

use super::readers::PaginatedResponse;

/// List reservations with status filter and pagination
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    params(ReservationQuery),
    responses(
        (status = 200, description = "List of reservations", body = PaginatedResponse<ReservationDetails>)
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<PaginatedResponse<ReservationDetails>>> {
    let (reservations, total) = state.services.reservations.search(&query).await?;

    Ok(Json(PaginatedResponse {
        items: reservations,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get reservation details
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "reservations",
    params(
        ("id" = i64, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation details", body = ReservationDetails),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetails>> {
    let reservation = state.services.reservations.get_reservation(id).await?;
    Ok(Json(reservation))
}

/// Reserve a book for a reader
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created", body = ReservationDetails),
        (status = 404, description = "Book or reader not found"),
        (status = 409, description = "Book already reserved or reader at their limit")
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<ReservationDetails>)> {
    let created = state.services.reservations.create_reservation(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Return a reserved book
#[utoipa::path(
    post,
    path = "/reservations/{id}/return",
    tag = "reservations",
    params(
        ("id" = i64, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReservationDetails),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Reservation already returned")
    )
)]
pub async fn return_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetails>> {
    let reservation = state.services.reservations.return_reservation(id).await?;
    Ok(Json(reservation))
}

/// Reactivate a returned reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/reopen",
    tag = "reservations",
    params(
        ("id" = i64, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation reactivated", body = ReservationDetails),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Book meanwhile reserved by someone else"),
        (status = 422, description = "Reservation is already active")
    )
)]
pub async fn reopen_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetails>> {
    let reservation = state.services.reservations.reopen_reservation(id).await?;
    Ok(Json(reservation))
}

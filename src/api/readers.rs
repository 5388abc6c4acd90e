//! Reader endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::reader::{Reader, ReaderDetails, ReaderInput, ReaderQuery},
};

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// List readers with search and pagination
#[utoipa::path(
    get,
    path = "/readers",
    tag = "readers",
    params(ReaderQuery),
    responses(
        (status = 200, description = "List of readers", body = PaginatedResponse<Reader>)
    )
)]
pub async fn list_readers(
    State(state): State<crate::AppState>,
    Query(query): Query<ReaderQuery>,
) -> AppResult<Json<PaginatedResponse<Reader>>> {
    let (readers, total) = state.services.readers.search(&query).await?;

    Ok(Json(PaginatedResponse {
        items: readers,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(15),
    }))
}

/// Get reader details with their reservations
#[utoipa::path(
    get,
    path = "/readers/{id}",
    tag = "readers",
    params(
        ("id" = i64, Path, description = "Reader ID")
    ),
    responses(
        (status = 200, description = "Reader details", body = ReaderDetails),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn get_reader(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReaderDetails>> {
    let reader = state.services.readers.get_reader(id).await?;
    Ok(Json(reader))
}

/// Register a new reader
#[utoipa::path(
    post,
    path = "/readers",
    tag = "readers",
    request_body = ReaderInput,
    responses(
        (status = 201, description = "Reader created", body = Reader),
        (status = 400, description = "Invalid input or duplicate email")
    )
)]
pub async fn create_reader(
    State(state): State<crate::AppState>,
    Json(input): Json<ReaderInput>,
) -> AppResult<(StatusCode, Json<Reader>)> {
    let created = state.services.readers.create_reader(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing reader
#[utoipa::path(
    put,
    path = "/readers/{id}",
    tag = "readers",
    params(
        ("id" = i64, Path, description = "Reader ID")
    ),
    request_body = ReaderInput,
    responses(
        (status = 200, description = "Reader updated", body = Reader),
        (status = 400, description = "Invalid input or duplicate email"),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn update_reader(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ReaderInput>,
) -> AppResult<Json<Reader>> {
    let updated = state.services.readers.update_reader(id, input).await?;
    Ok(Json(updated))
}

/// Delete a reader
#[utoipa::path(
    delete,
    path = "/readers/{id}",
    tag = "readers",
    params(
        ("id" = i64, Path, description = "Reader ID")
    ),
    responses(
        (status = 204, description = "Reader deleted"),
        (status = 404, description = "Reader not found"),
        (status = 409, description = "Reader has active reservations")
    )
)]
pub async fn delete_reader(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.readers.delete_reader(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

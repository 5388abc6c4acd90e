//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppResult;

/// Statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Book statistics
    pub books: BookStats,
    /// Reader statistics
    pub readers: ReaderStats,
    /// Reservation statistics
    pub reservations: ReservationStats,
    /// Most reserved books (top 10)
    pub popular_books: Vec<PopularBook>,
    /// Readers with the most reservations (top 10)
    pub active_readers: Vec<ActiveReader>,
    /// Reservations per month over the trailing six months
    pub monthly_reservations: Vec<StatEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct BookStats {
    /// Total number of books
    pub total: i64,
    /// Books with no active reservation
    pub available: i64,
    /// Books currently reserved
    pub reserved: i64,
}

#[derive(Serialize, ToSchema)]
pub struct ReaderStats {
    /// Total number of readers
    pub total: i64,
    /// Readers currently holding a reservation
    pub with_active_reservation: i64,
}

#[derive(Serialize, ToSchema)]
pub struct ReservationStats {
    /// All reservations, active and returned
    pub total: i64,
    /// Active reservations
    pub active: i64,
    /// Returned reservations
    pub returned: i64,
    /// Reservations created in the last 30 days
    pub last_30_days: i64,
}

#[derive(Serialize, FromRow, ToSchema)]
pub struct PopularBook {
    /// Book ID
    pub id: i64,
    /// Title
    pub title: String,
    /// Author
    pub author: String,
    /// Number of reservations, all statuses
    pub reservation_count: i64,
}

#[derive(Serialize, FromRow, ToSchema)]
pub struct ActiveReader {
    /// Reader ID
    pub id: i64,
    /// Name
    pub name: String,
    /// Number of reservations, all statuses
    pub reservation_count: i64,
}

#[derive(Serialize, ToSchema)]
pub struct StatEntry {
    /// Label
    pub label: String,
    /// Value
    pub value: i64,
}

/// Get library statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(State(state): State<crate::AppState>) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}

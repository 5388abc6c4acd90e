//! Reservation model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Reservation lifecycle status. Reservations are never deleted, only
/// transitioned between these two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ReservationStatus {
    Active,
    Returned,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationStatus::Active => write!(f, "active"),
            ReservationStatus::Returned => write!(f, "returned"),
        }
    }
}

/// Reservation model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: i64,
    pub book_id: i64,
    pub reader_id: i64,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

/// Reservation with book and reader context for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReservationDetails {
    pub id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub book_author: String,
    pub reader_id: i64,
    pub reader_name: String,
    pub reader_email: String,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

/// Create reservation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReservation {
    pub book_id: i64,
    pub reader_id: i64,
    pub notes: Option<String>,
}

/// Sort order for reservation listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub enum ReservationSort {
    #[serde(rename = "-created_at")]
    NewestFirst,
    #[serde(rename = "created_at")]
    OldestFirst,
    #[serde(rename = "book_title")]
    BookTitle,
    #[serde(rename = "reader_name")]
    ReaderName,
}

impl ReservationSort {
    /// ORDER BY fragment for this sort order
    pub fn as_order_by(&self) -> &'static str {
        match self {
            ReservationSort::NewestFirst => "r.created_at DESC",
            ReservationSort::OldestFirst => "r.created_at",
            ReservationSort::BookTitle => "b.title",
            ReservationSort::ReaderName => "rd.name",
        }
    }
}

/// Query parameters for reservation listings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ReservationQuery {
    /// Filter by status (active, returned)
    pub status: Option<ReservationStatus>,
    /// Substring search in book title/author or reader name/email
    pub search: Option<String>,
    /// Sort order (-created_at, created_at, book_title, reader_name)
    pub sort: Option<ReservationSort>,
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Reservations per page (default: 20)
    pub per_page: Option<i64>,
}

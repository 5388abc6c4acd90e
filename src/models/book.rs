//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::reservation::ReservationDetails;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub isbn: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book list entry with derived availability
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub isbn: Option<String>,
    /// True when no active reservation references the book
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book detail with its reservation history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub isbn: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub available: bool,
    /// The active reservation, if any
    pub current_reservation: Option<ReservationDetails>,
    /// Full reservation history, newest first
    pub history: Vec<ReservationDetails>,
}

/// Create/update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 2, max = 200, message = "Title must be 2 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 2, max = 150, message = "Author must be 2 to 150 characters"))]
    pub author: String,
    /// Publication year (1000..=current year)
    pub year: i32,
    pub isbn: Option<String>,
}

/// Sort order for book listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub enum BookSort {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "author")]
    Author,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "-year")]
    YearDesc,
}

impl BookSort {
    /// ORDER BY fragment for this sort order
    pub fn as_order_by(&self) -> &'static str {
        match self {
            BookSort::Title => "title",
            BookSort::Author => "author",
            BookSort::Year => "year",
            BookSort::YearDesc => "year DESC",
        }
    }
}

/// Query parameters for book listings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Substring search in title or author
    pub search: Option<String>,
    /// Filter by publication year
    pub year: Option<i32>,
    /// Filter by availability
    pub available: Option<bool>,
    /// Sort order (title, author, year, -year)
    pub sort: Option<BookSort>,
}

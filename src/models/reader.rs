//! Reader (library member) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::reservation::ReservationDetails;

/// Reader model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reader {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reader detail with active and past reservations
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReaderDetails {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active_reservations: Vec<ReservationDetails>,
    pub past_reservations: Vec<ReservationDetails>,
    pub total_reservations: i64,
}

/// Create/update reader request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReaderInput {
    #[validate(length(min = 2, max = 100, message = "Name must be 2 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Sort order for reader listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub enum ReaderSort {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "-created_at")]
    NewestFirst,
}

impl ReaderSort {
    /// ORDER BY fragment for this sort order
    pub fn as_order_by(&self) -> &'static str {
        match self {
            ReaderSort::Name => "name",
            ReaderSort::Email => "email",
            ReaderSort::NewestFirst => "created_at DESC",
        }
    }
}

/// Query parameters for reader listings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ReaderQuery {
    /// Substring search in name or email
    pub search: Option<String>,
    /// Sort order (name, email, -created_at)
    pub sort: Option<ReaderSort>,
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Readers per page (default: 15)
    pub per_page: Option<i64>,
}

//! Statistics service

use chrono::{Duration, Utc};
use sqlx::Row;

use crate::{
    api::stats::{
        ActiveReader, BookStats, PopularBook, ReaderStats, ReservationStats, StatEntry,
        StatsResponse,
    },
    error::AppResult,
    repository::Repository,
};

/// How far back the monthly reservation series reaches
const MONTHLY_SERIES_DAYS: i64 = 180;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Cheap connectivity probe for the readiness endpoint
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.repository.pool)
            .await?;
        Ok(())
    }

    /// Get library statistics: totals, most-reserved books, most active
    /// readers and the monthly reservation series.
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let pool = &self.repository.pool;
        let now = Utc::now();

        let total_books = self.repository.books.count().await?;
        let total_readers = self.repository.readers.count().await?;
        let total_reservations = self.repository.reservations.count().await?;
        let active_reservations = self.repository.reservations.count_active().await?;

        let available_books: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM books b
            WHERE NOT EXISTS (
                SELECT 1 FROM reservations r
                WHERE r.book_id = b.id AND r.status = 'active'
            )
            "#,
        )
        .fetch_one(pool)
        .await?;

        let readers_with_active: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT reader_id) FROM reservations WHERE status = 'active'",
        )
        .fetch_one(pool)
        .await?;

        let last_30_days: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE created_at >= ?1")
                .bind(now - Duration::days(30))
                .fetch_one(pool)
                .await?;

        let popular_books = sqlx::query_as::<_, PopularBook>(
            r#"
            SELECT b.id, b.title, b.author, COUNT(r.id) AS reservation_count
            FROM books b
            JOIN reservations r ON r.book_id = b.id
            GROUP BY b.id
            ORDER BY reservation_count DESC, b.title
            LIMIT 10
            "#,
        )
        .fetch_all(pool)
        .await?;

        let active_readers = sqlx::query_as::<_, ActiveReader>(
            r#"
            SELECT rd.id, rd.name, COUNT(r.id) AS reservation_count
            FROM readers rd
            JOIN reservations r ON r.reader_id = rd.id
            GROUP BY rd.id
            ORDER BY reservation_count DESC, rd.name
            LIMIT 10
            "#,
        )
        .fetch_all(pool)
        .await?;

        let monthly_rows = sqlx::query(
            r#"
            SELECT strftime('%Y-%m', created_at) AS month, COUNT(*) AS count
            FROM reservations
            WHERE created_at >= ?1
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(now - Duration::days(MONTHLY_SERIES_DAYS))
        .fetch_all(pool)
        .await?;

        let monthly_reservations = monthly_rows
            .into_iter()
            .map(|row| StatEntry {
                label: row.get("month"),
                value: row.get("count"),
            })
            .collect();

        Ok(StatsResponse {
            books: BookStats {
                total: total_books,
                available: available_books,
                reserved: total_books - available_books,
            },
            readers: ReaderStats {
                total: total_readers,
                with_active_reservation: readers_with_active,
            },
            reservations: ReservationStats {
                total: total_reservations,
                active: active_reservations,
                returned: total_reservations - active_reservations,
                last_30_days,
            },
            popular_books,
            active_readers,
            monthly_reservations,
        })
    }
}

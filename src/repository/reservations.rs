//! Reservations repository for database operations

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::reservation::{
        Reservation, ReservationDetails, ReservationQuery, ReservationSort, ReservationStatus,
    },
};

/// Columns and joins shared by every details query
const DETAILS_SELECT: &str = r#"
    SELECT r.id, r.book_id, b.title AS book_title, b.author AS book_author,
           r.reader_id, rd.name AS reader_name, rd.email AS reader_email,
           r.status, r.notes, r.created_at, r.returned_at
    FROM reservations r
    JOIN books b ON b.id = r.book_id
    JOIN readers rd ON rd.id = r.reader_id
"#;

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Sqlite>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// Get reservation with book and reader context
    pub async fn get_details(&self, id: i64) -> AppResult<ReservationDetails> {
        let sql = format!("{} WHERE r.id = ?1", DETAILS_SELECT);

        sqlx::query_as::<_, ReservationDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// Search reservations with status filter and pagination
    pub async fn search(
        &self,
        query: &ReservationQuery,
    ) -> AppResult<(Vec<ReservationDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        let order_by = query
            .sort
            .unwrap_or(ReservationSort::NewestFirst)
            .as_order_by();

        let filter = r#"
            WHERE (?1 IS NULL OR r.status = ?1)
              AND (?2 IS NULL
                   OR b.title LIKE '%' || ?2 || '%'
                   OR b.author LIKE '%' || ?2 || '%'
                   OR rd.name LIKE '%' || ?2 || '%'
                   OR rd.email LIKE '%' || ?2 || '%')
        "#;

        let count_sql = format!(
            r#"
            SELECT COUNT(*)
            FROM reservations r
            JOIN books b ON b.id = r.book_id
            JOIN readers rd ON rd.id = r.reader_id
            {}
            "#,
            filter,
        );

        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(query.status)
            .bind(query.search.as_deref())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "{} {} ORDER BY {} LIMIT ?3 OFFSET ?4",
            DETAILS_SELECT, filter, order_by,
        );

        let reservations = sqlx::query_as::<_, ReservationDetails>(&sql)
            .bind(query.status)
            .bind(query.search.as_deref())
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((reservations, total))
    }

    /// The active reservation holding a book, if any
    pub async fn active_for_book(&self, book_id: i64) -> AppResult<Option<ReservationDetails>> {
        let sql = format!(
            "{} WHERE r.book_id = ?1 AND r.status = 'active'",
            DETAILS_SELECT
        );

        let reservation = sqlx::query_as::<_, ReservationDetails>(&sql)
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(reservation)
    }

    /// Full reservation history of a book, newest first
    pub async fn history_for_book(&self, book_id: i64) -> AppResult<Vec<ReservationDetails>> {
        let sql = format!(
            "{} WHERE r.book_id = ?1 ORDER BY r.created_at DESC",
            DETAILS_SELECT
        );

        let reservations = sqlx::query_as::<_, ReservationDetails>(&sql)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(reservations)
    }

    /// All reservations held by a reader, newest first
    pub async fn for_reader(&self, reader_id: i64) -> AppResult<Vec<ReservationDetails>> {
        let sql = format!(
            "{} WHERE r.reader_id = ?1 ORDER BY r.created_at DESC",
            DETAILS_SELECT
        );

        let reservations = sqlx::query_as::<_, ReservationDetails>(&sql)
            .bind(reader_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(reservations)
    }

    /// Whether a reader currently holds any active reservation
    pub async fn has_active_for_reader(&self, reader_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE reader_id = ?1 AND status = 'active')",
        )
        .bind(reader_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a new reservation for a book.
    ///
    /// The whole check-then-insert sequence runs inside one transaction;
    /// the partial unique index on active reservations catches two
    /// requests racing past the availability check, which is reported as
    /// a conflict rather than a storage failure.
    pub async fn create(
        &self,
        book_id: i64,
        reader_id: i64,
        notes: Option<&str>,
        max_active_per_reader: i64,
    ) -> AppResult<ReservationDetails> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let book_title: String = sqlx::query_scalar("SELECT title FROM books WHERE id = ?1")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let reader_name: String = sqlx::query_scalar("SELECT name FROM readers WHERE id = ?1")
            .bind(reader_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reader with id {} not found", reader_id)))?;

        // Availability check
        let holder: Option<String> = sqlx::query_scalar(
            r#"
            SELECT rd.name FROM reservations r
            JOIN readers rd ON rd.id = r.reader_id
            WHERE r.book_id = ?1 AND r.status = 'active'
            "#,
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(holder_name) = holder {
            return Err(AppError::Conflict(format!(
                "Book \"{}\" is already reserved by {}",
                book_title, holder_name
            )));
        }

        // Reader quota check
        let active_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations WHERE reader_id = ?1 AND status = 'active'",
        )
        .bind(reader_id)
        .fetch_one(&mut *tx)
        .await?;

        if active_count >= max_active_per_reader {
            return Err(AppError::Conflict(format!(
                "Reader \"{}\" already has {} active reservation(s)",
                reader_name, active_count
            )));
        }

        let insert = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reservations (book_id, reader_id, status, notes, created_at)
            VALUES (?1, ?2, 'active', ?3, ?4)
            RETURNING id
            "#,
        )
        .bind(book_id)
        .bind(reader_id)
        .bind(notes)
        .bind(now)
        .fetch_one(&mut *tx)
        .await;

        let id = match insert {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict(format!(
                    "Book \"{}\" is already reserved",
                    book_title
                )));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;

        self.get_details(id).await
    }

    /// Mark a reservation as returned, making the book available again
    pub async fn return_reservation(&self, id: i64) -> AppResult<ReservationDetails> {
        let now = Utc::now();

        let reservation = self.get_by_id(id).await?;

        if reservation.status == ReservationStatus::Returned {
            return Err(AppError::State("Reservation already returned".to_string()));
        }

        let affected = sqlx::query(
            r#"
            UPDATE reservations
            SET status = 'returned', returned_at = ?1
            WHERE id = ?2 AND status = 'active'
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::State("Reservation already returned".to_string()));
        }

        self.get_details(id).await
    }

    /// Reactivate a returned reservation, if the book is still free
    pub async fn reopen(&self, id: i64) -> AppResult<ReservationDetails> {
        let mut tx = self.pool.begin().await?;

        let reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Reservation with id {} not found", id))
                })?;

        if reservation.status == ReservationStatus::Active {
            return Err(AppError::State("Reservation is already active".to_string()));
        }

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE book_id = ?1 AND status = 'active')",
        )
        .bind(reservation.book_id)
        .fetch_one(&mut *tx)
        .await?;

        if taken {
            return Err(AppError::Conflict(
                "Book is already reserved by someone else".to_string(),
            ));
        }

        let update = sqlx::query(
            "UPDATE reservations SET status = 'active', returned_at = NULL WHERE id = ?1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await;

        match update {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict(
                    "Book is already reserved by someone else".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;

        self.get_details(id).await
    }

    /// Count reservations, all statuses
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count active reservations
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

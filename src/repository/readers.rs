//! Readers repository for database operations

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::reader::{Reader, ReaderQuery, ReaderSort},
};

#[derive(Clone)]
pub struct ReadersRepository {
    pool: Pool<Sqlite>,
}

impl ReadersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// A unique-index violation on insert/update means a duplicate email
    /// raced past the service-level check
    fn map_email_violation(e: sqlx::Error) -> AppError {
        if e.as_database_error()
            .map(|d| d.is_unique_violation())
            .unwrap_or(false)
        {
            AppError::Validation(
                "This email address is already used by another reader".to_string(),
            )
        } else {
            e.into()
        }
    }

    /// Get reader by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Reader> {
        sqlx::query_as::<_, Reader>("SELECT * FROM readers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reader with id {} not found", id)))
    }

    /// Check if an email is already used by another reader. Emails are
    /// stored normalized (trimmed, lowercased) so equality is enough.
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM readers WHERE email = ?1 AND id != ?2)")
                .bind(email)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM readers WHERE email = ?1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Search readers with pagination
    pub async fn search(&self, query: &ReaderQuery) -> AppResult<(Vec<Reader>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(15).clamp(1, 100);
        let offset = (page - 1) * per_page;
        let order_by = query.sort.unwrap_or(ReaderSort::Name).as_order_by();

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM readers
            WHERE (?1 IS NULL OR name LIKE '%' || ?1 || '%' OR email LIKE '%' || ?1 || '%')
            "#,
        )
        .bind(query.search.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            r#"
            SELECT * FROM readers
            WHERE (?1 IS NULL OR name LIKE '%' || ?1 || '%' OR email LIKE '%' || ?1 || '%')
            ORDER BY {}
            LIMIT ?2 OFFSET ?3
            "#,
            order_by,
        );

        let readers = sqlx::query_as::<_, Reader>(&sql)
            .bind(query.search.as_deref())
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((readers, total))
    }

    /// Insert a new reader
    pub async fn create(&self, name: &str, email: &str) -> AppResult<Reader> {
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO readers (name, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_email_violation)?;

        self.get_by_id(id).await
    }

    /// Update an existing reader
    pub async fn update(&self, id: i64, name: &str, email: &str) -> AppResult<Reader> {
        let now = Utc::now();

        let affected = sqlx::query(
            "UPDATE readers SET name = ?1, email = ?2, updated_at = ?3 WHERE id = ?4",
        )
        .bind(name)
        .bind(email)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Self::map_email_violation)?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "Reader with id {} not found",
                id
            )));
        }

        self.get_by_id(id).await
    }

    /// Delete a reader. Associated reservations are removed by the cascade;
    /// callers must refuse deletion while an active reservation exists.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let affected = sqlx::query("DELETE FROM readers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "Reader with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Count all readers
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM readers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

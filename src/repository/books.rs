//! Books repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, BookSort, BookSummary},
};

/// A book is available when no active reservation references it.
const AVAILABLE_PREDICATE: &str =
    "NOT EXISTS (SELECT 1 FROM reservations r WHERE r.book_id = b.id AND r.status = 'active')";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// A unique-index violation on insert/update means a duplicate ISBN
    /// raced past the service-level check
    fn map_isbn_violation(e: sqlx::Error) -> AppError {
        if e.as_database_error()
            .map(|d| d.is_unique_violation())
            .unwrap_or(false)
        {
            AppError::Validation("This ISBN is already used by another book".to_string())
        } else {
            e.into()
        }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check whether the book currently has no active reservation
    pub async fn is_available(&self, id: i64) -> AppResult<bool> {
        let available: bool = sqlx::query_scalar(&format!(
            "SELECT {} FROM books b WHERE b.id = ?1",
            AVAILABLE_PREDICATE
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(available)
    }

    /// List books with optional search, year and availability filters.
    /// Returns the full (unpaginated) ordered list.
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<BookSummary>> {
        let order_by = query.sort.unwrap_or(BookSort::Title).as_order_by();

        let sql = format!(
            r#"
            SELECT b.id, b.title, b.author, b.year, b.isbn,
                   {available} AS available,
                   b.created_at, b.updated_at
            FROM books b
            WHERE (?1 IS NULL OR b.title LIKE '%' || ?1 || '%' OR b.author LIKE '%' || ?1 || '%')
              AND (?2 IS NULL OR b.year = ?2)
              AND (?3 IS NULL OR ({available}) = ?3)
            ORDER BY b.{order_by}
            "#,
            available = AVAILABLE_PREDICATE,
            order_by = order_by,
        );

        let books = sqlx::query_as::<_, BookSummary>(&sql)
            .bind(query.search.as_deref())
            .bind(query.year)
            .bind(query.available)
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Check if an ISBN is already used by another book
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = ?1 AND id != ?2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = ?1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Insert a new book
    pub async fn create(
        &self,
        title: &str,
        author: &str,
        year: i32,
        isbn: Option<&str>,
    ) -> AppResult<Book> {
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, year, isbn, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(year)
        .bind(isbn)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_isbn_violation)?;

        self.get_by_id(id).await
    }

    /// Update an existing book
    pub async fn update(
        &self,
        id: i64,
        title: &str,
        author: &str,
        year: i32,
        isbn: Option<&str>,
    ) -> AppResult<Book> {
        let now: DateTime<Utc> = Utc::now();

        let affected = sqlx::query(
            r#"
            UPDATE books
            SET title = ?1, author = ?2, year = ?3, isbn = ?4, updated_at = ?5
            WHERE id = ?6
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(year)
        .bind(isbn)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Self::map_isbn_violation)?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a book. Associated reservations are removed by the cascade;
    /// callers must refuse deletion while an active reservation exists.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let affected = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_util::test_pool;
    use crate::repository::Repository;

    #[tokio::test]
    async fn list_is_empty_on_fresh_database() {
        let repo = Repository::new(test_pool().await);

        let books = repo.books.list(&BookQuery::default()).await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn created_book_appears_in_list_and_is_available() {
        let repo = Repository::new(test_pool().await);

        repo.books
            .create("1984", "George Orwell", 1949, None)
            .await
            .unwrap();

        let books = repo.books.list(&BookQuery::default()).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "1984");
        assert_eq!(books[0].author, "George Orwell");
        assert!(books[0].available);
    }

    #[tokio::test]
    async fn create_then_get_round_trips_field_values() {
        let repo = Repository::new(test_pool().await);

        let created = repo
            .books
            .create("Dune", "Frank Herbert", 1965, Some("978-0-441-17271-9"))
            .await
            .unwrap();

        let fetched = repo.books.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.title, created.title);
        assert_eq!(fetched.author, created.author);
        assert_eq!(fetched.year, created.year);
        assert_eq!(fetched.isbn, created.isbn);
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn get_unknown_book_is_not_found() {
        let repo = Repository::new(test_pool().await);

        let err = repo.books.get_by_id(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_ordered_by_title_by_default() {
        let repo = Repository::new(test_pool().await);

        repo.books
            .create("Ubik", "Philip K. Dick", 1969, None)
            .await
            .unwrap();
        repo.books
            .create("Dune", "Frank Herbert", 1965, None)
            .await
            .unwrap();

        let books = repo.books.list(&BookQuery::default()).await.unwrap();
        let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Dune", "Ubik"]);
    }

    #[tokio::test]
    async fn list_filters_by_search_and_year() {
        let repo = Repository::new(test_pool().await);

        repo.books
            .create("Dune", "Frank Herbert", 1965, None)
            .await
            .unwrap();
        repo.books
            .create("Dune Messiah", "Frank Herbert", 1969, None)
            .await
            .unwrap();
        repo.books
            .create("Ubik", "Philip K. Dick", 1969, None)
            .await
            .unwrap();

        let query = BookQuery {
            search: Some("dune".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.books.list(&query).await.unwrap().len(), 2);

        let query = BookQuery {
            year: Some(1969),
            ..Default::default()
        };
        let books = repo.books.list(&query).await.unwrap();
        assert_eq!(books.len(), 2);

        let query = BookQuery {
            search: Some("dune".to_string()),
            year: Some(1969),
            ..Default::default()
        };
        let books = repo.books.list(&query).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune Messiah");
    }

    #[tokio::test]
    async fn update_replaces_fields_and_bumps_updated_at() {
        let repo = Repository::new(test_pool().await);

        let created = repo
            .books
            .create("Dune", "Frank Herbert", 1964, None)
            .await
            .unwrap();

        let updated = repo
            .books
            .update(created.id, "Dune", "Frank Herbert", 1965, None)
            .await
            .unwrap();

        assert_eq!(updated.year, 1965);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn isbn_exists_ignores_the_excluded_book() {
        let repo = Repository::new(test_pool().await);

        let created = repo
            .books
            .create("Dune", "Frank Herbert", 1965, Some("978-0-441-17271-9"))
            .await
            .unwrap();

        assert!(repo
            .books
            .isbn_exists("978-0-441-17271-9", None)
            .await
            .unwrap());
        assert!(!repo
            .books
            .isbn_exists("978-0-441-17271-9", Some(created.id))
            .await
            .unwrap());
    }
}

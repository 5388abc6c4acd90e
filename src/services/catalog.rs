//! Catalog (books) service

use chrono::{Datelike, Utc};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDetails, BookInput, BookQuery, BookSummary},
    repository::Repository,
};

/// Normalized create/update fields after trimming
struct CleanBookInput {
    title: String,
    author: String,
    year: i32,
    isbn: Option<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Validate and normalize a book payload
    async fn clean_input(
        &self,
        input: BookInput,
        exclude_id: Option<i64>,
    ) -> AppResult<CleanBookInput> {
        let input = BookInput {
            title: input.title.trim().to_string(),
            author: input.author.trim().to_string(),
            year: input.year,
            isbn: input
                .isbn
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };
        input.validate()?;

        let current_year = Utc::now().year();
        if input.year > current_year {
            return Err(AppError::Validation(
                "Publication year cannot be in the future".to_string(),
            ));
        }
        if input.year < 1000 {
            return Err(AppError::Validation(
                "Publication year must be 1000 or later".to_string(),
            ));
        }

        if let Some(ref isbn) = input.isbn {
            if self.repository.books.isbn_exists(isbn, exclude_id).await? {
                return Err(AppError::Validation(
                    "This ISBN is already used by another book".to_string(),
                ));
            }
        }

        Ok(CleanBookInput {
            title: input.title,
            author: input.author,
            year: input.year,
            isbn: input.isbn,
        })
    }

    /// List books with optional filters, ordered by title by default
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<BookSummary>> {
        self.repository.books.list(query).await
    }

    /// Get a book with its availability and reservation history
    pub async fn get_book(&self, id: i64) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let current_reservation = self.repository.reservations.active_for_book(id).await?;
        let history = self.repository.reservations.history_for_book(id).await?;

        Ok(BookDetails {
            id: book.id,
            title: book.title,
            author: book.author,
            year: book.year,
            isbn: book.isbn,
            created_at: book.created_at,
            updated_at: book.updated_at,
            available: current_reservation.is_none(),
            current_reservation,
            history,
        })
    }

    /// Create a new book
    pub async fn create_book(&self, input: BookInput) -> AppResult<Book> {
        let clean = self.clean_input(input, None).await?;
        self.repository
            .books
            .create(&clean.title, &clean.author, clean.year, clean.isbn.as_deref())
            .await
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i64, input: BookInput) -> AppResult<Book> {
        // Existence first, so an unknown id is not reported as a validation error
        self.repository.books.get_by_id(id).await?;

        let clean = self.clean_input(input, Some(id)).await?;
        self.repository
            .books
            .update(
                id,
                &clean.title,
                &clean.author,
                clean.year,
                clean.isbn.as_deref(),
            )
            .await
    }

    /// Delete a book, unless an active reservation holds it
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        let book = self.repository.books.get_by_id(id).await?;

        if let Some(reservation) = self.repository.reservations.active_for_book(id).await? {
            return Err(AppError::Conflict(format!(
                "Cannot delete \"{}\": reserved by {}",
                book.title, reservation.reader_name
            )));
        }

        self.repository.books.delete(id).await
    }
}

//! Readers service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::reader::{Reader, ReaderDetails, ReaderInput, ReaderQuery},
    models::reservation::ReservationStatus,
    repository::Repository,
};

#[derive(Clone)]
pub struct ReadersService {
    repository: Repository,
}

impl ReadersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Validate and normalize a reader payload. Emails are stored
    /// trimmed and lowercased so uniqueness is case-insensitive.
    async fn clean_input(
        &self,
        input: ReaderInput,
        exclude_id: Option<i64>,
    ) -> AppResult<(String, String)> {
        let input = ReaderInput {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
        };
        input.validate()?;

        if input.name.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation(
                "Name cannot consist only of digits".to_string(),
            ));
        }

        if self
            .repository
            .readers
            .email_exists(&input.email, exclude_id)
            .await?
        {
            return Err(AppError::Validation(
                "This email address is already used by another reader".to_string(),
            ));
        }

        Ok((input.name, input.email))
    }

    /// Search readers with pagination
    pub async fn search(&self, query: &ReaderQuery) -> AppResult<(Vec<Reader>, i64)> {
        self.repository.readers.search(query).await
    }

    /// Get a reader with their active and past reservations
    pub async fn get_reader(&self, id: i64) -> AppResult<ReaderDetails> {
        let reader = self.repository.readers.get_by_id(id).await?;
        let reservations = self.repository.reservations.for_reader(id).await?;

        let total_reservations = reservations.len() as i64;
        let (active, past): (Vec<_>, Vec<_>) = reservations
            .into_iter()
            .partition(|r| r.status == ReservationStatus::Active);

        Ok(ReaderDetails {
            id: reader.id,
            name: reader.name,
            email: reader.email,
            created_at: reader.created_at,
            updated_at: reader.updated_at,
            active_reservations: active,
            past_reservations: past,
            total_reservations,
        })
    }

    /// Create a new reader
    pub async fn create_reader(&self, input: ReaderInput) -> AppResult<Reader> {
        let (name, email) = self.clean_input(input, None).await?;
        self.repository.readers.create(&name, &email).await
    }

    /// Update an existing reader
    pub async fn update_reader(&self, id: i64, input: ReaderInput) -> AppResult<Reader> {
        self.repository.readers.get_by_id(id).await?;

        let (name, email) = self.clean_input(input, Some(id)).await?;
        self.repository.readers.update(id, &name, &email).await
    }

    /// Delete a reader, unless they hold an active reservation
    pub async fn delete_reader(&self, id: i64) -> AppResult<()> {
        let reader = self.repository.readers.get_by_id(id).await?;

        if self
            .repository
            .reservations
            .has_active_for_reader(id)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Cannot delete \"{}\": there are active reservations",
                reader.name
            )));
        }

        self.repository.readers.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_util::test_pool;

    fn input(name: &str, email: &str) -> ReaderInput {
        ReaderInput {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    async fn service() -> ReadersService {
        ReadersService::new(Repository::new(test_pool().await))
    }

    #[tokio::test]
    async fn create_normalizes_the_email() {
        let readers = service().await;

        let reader = readers
            .create_reader(input(" Winston Smith ", "  Winston@Example.COM "))
            .await
            .unwrap();

        assert_eq!(reader.name, "Winston Smith");
        assert_eq!(reader.email, "winston@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_fails_validation() {
        let readers = service().await;

        readers
            .create_reader(input("Winston Smith", "winston@example.com"))
            .await
            .unwrap();

        // Same address in a different case is still a duplicate
        let err = readers
            .create_reader(input("Julia", "WINSTON@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn malformed_email_fails_validation() {
        let readers = service().await;

        let err = readers
            .create_reader(input("Winston Smith", "not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn all_digit_name_fails_validation() {
        let readers = service().await;

        let err = readers
            .create_reader(input("12345", "winston@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_keeps_own_email_without_conflict() {
        let readers = service().await;

        let reader = readers
            .create_reader(input("Winston Smith", "winston@example.com"))
            .await
            .unwrap();

        let updated = readers
            .update_reader(reader.id, input("Winston S.", "winston@example.com"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Winston S.");
    }

    #[tokio::test]
    async fn delete_is_blocked_while_a_reservation_is_active() {
        let readers = service().await;
        let repo = readers.repository.clone();

        let reader = readers
            .create_reader(input("Winston Smith", "winston@example.com"))
            .await
            .unwrap();
        let book = repo
            .books
            .create("1984", "George Orwell", 1949, None)
            .await
            .unwrap();
        let reservation = repo
            .reservations
            .create(book.id, reader.id, None, 1)
            .await
            .unwrap();

        let err = readers.delete_reader(reader.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        repo.reservations
            .return_reservation(reservation.id)
            .await
            .unwrap();
        readers.delete_reader(reader.id).await.unwrap();
        assert_eq!(repo.readers.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn detail_splits_active_and_past_reservations() {
        let readers = service().await;
        let repo = readers.repository.clone();

        let reader = readers
            .create_reader(input("Winston Smith", "winston@example.com"))
            .await
            .unwrap();
        let first_book = repo
            .books
            .create("1984", "George Orwell", 1949, None)
            .await
            .unwrap();
        let second_book = repo
            .books
            .create("Animal Farm", "George Orwell", 1945, None)
            .await
            .unwrap();

        let first = repo
            .reservations
            .create(first_book.id, reader.id, None, 5)
            .await
            .unwrap();
        repo.reservations
            .create(second_book.id, reader.id, None, 5)
            .await
            .unwrap();
        repo.reservations.return_reservation(first.id).await.unwrap();

        let details = readers.get_reader(reader.id).await.unwrap();
        assert_eq!(details.total_reservations, 2);
        assert_eq!(details.active_reservations.len(), 1);
        assert_eq!(details.past_reservations.len(), 1);
        assert_eq!(details.active_reservations[0].book_title, "Animal Farm");
        assert_eq!(details.past_reservations[0].book_title, "1984");
    }
}

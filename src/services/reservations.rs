//! Reservation workflow service

use crate::{
    config::ReservationsConfig,
    error::AppResult,
    models::reservation::{CreateReservation, ReservationDetails, ReservationQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
    config: ReservationsConfig,
}

impl ReservationsService {
    pub fn new(repository: Repository, config: ReservationsConfig) -> Self {
        Self { repository, config }
    }

    /// Search reservations with pagination
    pub async fn search(
        &self,
        query: &ReservationQuery,
    ) -> AppResult<(Vec<ReservationDetails>, i64)> {
        self.repository.reservations.search(query).await
    }

    /// Get reservation with book and reader context
    pub async fn get_reservation(&self, id: i64) -> AppResult<ReservationDetails> {
        self.repository.reservations.get_details(id).await
    }

    /// Reserve a book for a reader. Fails when the book is already held
    /// or the reader is at their active-reservation limit.
    pub async fn create_reservation(
        &self,
        request: CreateReservation,
    ) -> AppResult<ReservationDetails> {
        let notes = request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        self.repository
            .reservations
            .create(
                request.book_id,
                request.reader_id,
                notes,
                self.config.max_active_per_reader,
            )
            .await
    }

    /// Return a reserved book, closing the reservation
    pub async fn return_reservation(&self, id: i64) -> AppResult<ReservationDetails> {
        self.repository.reservations.return_reservation(id).await
    }

    /// Reactivate a returned reservation, if the book is still free
    pub async fn reopen_reservation(&self, id: i64) -> AppResult<ReservationDetails> {
        self.repository.reservations.reopen(id).await
    }
}

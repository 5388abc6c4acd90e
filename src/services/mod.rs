//! Business logic services

pub mod catalog;
pub mod readers;
pub mod reservations;
pub mod stats;

use crate::{config::ReservationsConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub readers: readers::ReadersService,
    pub reservations: reservations::ReservationsService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, reservations_config: ReservationsConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            readers: readers::ReadersService::new(repository.clone()),
            reservations: reservations::ReservationsService::new(
                repository.clone(),
                reservations_config,
            ),
            stats: stats::StatsService::new(repository),
        }
    }
}

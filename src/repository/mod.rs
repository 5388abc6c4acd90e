//! Repository layer for database operations

pub mod books;
pub mod readers;
pub mod reservations;

use sqlx::{Pool, Sqlite};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
    pub books: books::BooksRepository,
    pub readers: readers::ReadersRepository,
    pub reservations: reservations::ReservationsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            readers: readers::ReadersRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            pool,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::str::FromStr;

    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::{Pool, Sqlite};

    /// In-memory database with migrations applied. A single connection is
    /// required: each `:memory:` connection is its own database.
    pub async fn test_pool() -> Pool<Sqlite> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("Invalid database URL")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to open in-memory database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }
}

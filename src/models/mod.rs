//! Data models for Biblio

pub mod book;
pub mod reader;
pub mod reservation;

// Re-export commonly used types
pub use book::{Book, BookDetails, BookSummary};
pub use reader::{Reader, ReaderDetails};
pub use reservation::{Reservation, ReservationDetails, ReservationStatus};

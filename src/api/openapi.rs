//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, readers, reservations, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblio API",
        version = "1.0.0",
        description = "Library Reservation System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Biblio Team")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Readers
        readers::list_readers,
        readers::get_reader,
        readers::create_reader,
        readers::update_reader,
        readers::delete_reader,
        // Reservations
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::create_reservation,
        reservations::return_reservation,
        reservations::reopen_reservation,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookDetails,
            crate::models::book::BookInput,
            crate::models::book::BookSort,
            // Readers
            crate::models::reader::Reader,
            crate::models::reader::ReaderDetails,
            crate::models::reader::ReaderInput,
            crate::models::reader::ReaderSort,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationDetails,
            crate::models::reservation::CreateReservation,
            crate::models::reservation::ReservationStatus,
            crate::models::reservation::ReservationSort,
            // Stats
            stats::StatsResponse,
            stats::BookStats,
            stats::ReaderStats,
            stats::ReservationStats,
            stats::PopularBook,
            stats::ActiveReader,
            stats::StatEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "readers", description = "Reader management"),
        (name = "reservations", description = "Reservation workflow"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, reservations, schedules, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioflow API",
        version = "1.0.0",
        description = "Library Lending and Reservation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Catalog
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::receive_stock,
        books::remove_stock,
        books::list_authors,
        books::create_author,
        books::delete_author,
        books::list_publishers,
        books::create_publisher,
        books::delete_publisher,
        // Reservations
        reservations::list_user_reservations,
        reservations::create_reservation,
        reservations::extend_reservation,
        reservations::return_reservation,
        reservations::return_line,
        reservations::delete_reservation,
        // Schedules
        schedules::list_user_schedules,
        schedules::create_schedule,
        schedules::change_schedule_status,
    ),
    components(
        schemas(
            // Health
            health::HealthResponse,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Catalog
            crate::models::book::Book,
            crate::models::book::BookDetails,
            crate::models::book::BookPage,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::Author,
            crate::models::book::Publisher,
            crate::models::book::CreateName,
            books::StockRequest,
            books::StockResponse,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationLine,
            crate::models::reservation::ReservationDetails,
            crate::models::reservation::CreateReservation,
            // Schedules
            crate::models::schedule::Schedule,
            crate::models::schedule::ScheduleLine,
            crate::models::schedule::ScheduleDetails,
            crate::models::schedule::ScheduleStatus,
            crate::models::schedule::CreateSchedule,
            crate::models::schedule::ChangeScheduleStatus,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Authentication"),
        (name = "users", description = "User management"),
        (name = "books", description = "Book catalog and stock"),
        (name = "catalog", description = "Authors and publishers"),
        (name = "reservations", description = "Active loans"),
        (name = "schedules", description = "Future pickups"),
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

//! Catalog models (books, authors, publishers)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book model from database
///
/// `quantity` is the total number of copies owned, `available` the number
/// currently on the shelf. Both counters are mutated only through the
/// stock ledger, which maintains `0 <= available <= quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub publisher_id: Option<i32>,
    /// Total copies owned
    pub quantity: i32,
    /// Copies currently loanable
    pub available: i32,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Book list entry with resolved author/publisher names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub author_name: Option<String>,
    pub publisher_id: Option<i32>,
    pub publisher_name: Option<String>,
    pub quantity: i32,
    pub available: i32,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Paginated book list
#[derive(Debug, Serialize, ToSchema)]
pub struct BookPage {
    pub books: Vec<BookDetails>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Query parameters for book listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Case-insensitive title search
    pub search: Option<String>,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Page size (max 100)
    pub per_page: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub author_id: Option<i32>,
    pub publisher_id: Option<i32>,
    /// Initial number of copies; all start available
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub quantity: i32,
}

/// Update book request (metadata only, counters go through the stock ledger)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub author_id: Option<i32>,
    pub publisher_id: Option<i32>,
}

/// Author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
}

/// Publisher model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Publisher {
    pub id: i32,
    pub name: String,
}

/// Create author/publisher request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateName {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
}

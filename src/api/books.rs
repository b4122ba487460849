//! Catalog endpoints (books, authors, publishers, stock)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Author, Book, BookPage, BookQuery, CreateBook, CreateName, Publisher, UpdateBook},
    AppState,
};

use super::AuthenticatedUser;

/// Stock mutation request
#[derive(Deserialize, Validate, ToSchema)]
pub struct StockRequest {
    /// Number of copies
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount: i32,
}

/// Stock state after a mutation
#[derive(Serialize, ToSchema)]
pub struct StockResponse {
    pub book_id: i32,
    pub quantity: i32,
    pub available: i32,
}

/// List books with pagination and title search
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Paginated books", body = BookPage)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<BookPage>> {
    let page = state.services.catalog.list_books(&query).await?;
    Ok(Json(page))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book found", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(book_id).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 409, description = "Title already exists")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_admin()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.create_book(&request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update book metadata
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Title already exists")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require_admin()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.update_book(book_id, &request).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_book(book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Receive new copies into stock
#[utoipa::path(
    post,
    path = "/books/{id}/stock/receive",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = StockRequest,
    responses(
        (status = 200, description = "Stock updated", body = StockResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn receive_stock(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<StockRequest>,
) -> AppResult<Json<StockResponse>> {
    claims.require_admin()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let level = state
        .services
        .catalog
        .receive_stock(book_id, request.amount)
        .await?;
    Ok(Json(StockResponse {
        book_id,
        quantity: level.quantity,
        available: level.available,
    }))
}

/// Remove copies from stock permanently
#[utoipa::path(
    post,
    path = "/books/{id}/stock/remove",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = StockRequest,
    responses(
        (status = 200, description = "Stock updated", body = StockResponse),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Not enough copies in stock")
    )
)]
pub async fn remove_stock(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<StockRequest>,
) -> AppResult<Json<StockResponse>> {
    claims.require_admin()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let level = state
        .services
        .catalog
        .remove_stock(book_id, request.amount)
        .await?;
    Ok(Json(StockResponse {
        book_id,
        quantity: level.quantity,
        available: level.available,
    }))
}

/// List authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All authors", body = Vec<Author>)
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateName,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 409, description = "Name already exists")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateName>,
) -> AppResult<(StatusCode, Json<Author>)> {
    claims.require_admin()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let author = state.services.catalog.create_author(&request.name).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(author_id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_author(author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List publishers
#[utoipa::path(
    get,
    path = "/publishers",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All publishers", body = Vec<Publisher>)
    )
)]
pub async fn list_publishers(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Publisher>>> {
    let publishers = state.services.catalog.list_publishers().await?;
    Ok(Json(publishers))
}

/// Create a publisher
#[utoipa::path(
    post,
    path = "/publishers",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateName,
    responses(
        (status = 201, description = "Publisher created", body = Publisher),
        (status = 409, description = "Name already exists")
    )
)]
pub async fn create_publisher(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateName>,
) -> AppResult<(StatusCode, Json<Publisher>)> {
    claims.require_admin()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let publisher = state
        .services
        .catalog
        .create_publisher(&request.name)
        .await?;
    Ok((StatusCode::CREATED, Json(publisher)))
}

/// Delete a publisher
#[utoipa::path(
    delete,
    path = "/publishers/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Publisher ID")
    ),
    responses(
        (status = 204, description = "Publisher deleted"),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn delete_publisher(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(publisher_id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_publisher(publisher_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

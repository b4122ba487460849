//! Catalog service (books, authors, publishers, stock)

use crate::{
    domain::stock::StockLevel,
    error::{AppError, AppResult},
    models::book::{Author, Book, BookPage, BookQuery, CreateBook, Publisher, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // ---- Books ----

    pub async fn list_books(&self, query: &BookQuery) -> AppResult<BookPage> {
        self.repository.books.list(query).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, data: &CreateBook) -> AppResult<Book> {
        if self.repository.books.title_exists(&data.title, None).await? {
            return Err(AppError::Conflict(format!(
                "Book '{}' already exists",
                data.title
            )));
        }
        let book = self.repository.books.create(data).await?;
        tracing::info!(book_id = book.id, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        if let Some(ref title) = data.title {
            if self.repository.books.title_exists(title, Some(id)).await? {
                return Err(AppError::Conflict(format!("Book '{}' already exists", title)));
            }
        }
        self.repository.books.update(id, data).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    // ---- Stock ledger ----

    /// New copies enter the collection
    pub async fn receive_stock(&self, book_id: i32, amount: i32) -> AppResult<StockLevel> {
        let mut tx = self.repository.pool.begin().await?;
        let level = self
            .repository
            .books
            .receive_stock(&mut tx, book_id, amount)
            .await?;
        tx.commit().await?;
        tracing::info!(book_id, amount, "Stock received");
        Ok(level)
    }

    /// Copies leave the collection for good
    pub async fn remove_stock(&self, book_id: i32, amount: i32) -> AppResult<StockLevel> {
        let mut tx = self.repository.pool.begin().await?;
        let level = self
            .repository
            .books
            .remove_stock(&mut tx, book_id, amount)
            .await?;
        tx.commit().await?;
        tracing::info!(book_id, amount, "Stock removed");
        Ok(level)
    }

    // ---- Authors & publishers ----

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.books.list_authors().await
    }

    pub async fn create_author(&self, name: &str) -> AppResult<Author> {
        self.repository.books.create_author(name).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete_author(id).await
    }

    pub async fn list_publishers(&self) -> AppResult<Vec<Publisher>> {
        self.repository.books.list_publishers().await
    }

    pub async fn create_publisher(&self, name: &str) -> AppResult<Publisher> {
        self.repository.books.create_publisher(name).await
    }

    pub async fn delete_publisher(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete_publisher(id).await
    }
}

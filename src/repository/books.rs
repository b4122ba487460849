//! Catalog repository (books, authors, publishers) and stock persistence
//!
//! Stock mutations run against a caller-owned connection so a service can
//! group them with other writes in one transaction; each locks the book
//! row before applying the ledger arithmetic.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    domain::stock::StockLevel,
    error::{AppError, AppResult},
    models::book::{Author, Book, BookDetails, BookPage, BookQuery, CreateBook, Publisher, UpdateBook},
};

const MAX_PER_PAGE: i64 = 100;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Resolve a batch of book IDs; missing IDs simply yield fewer rows
    pub async fn get_many(&self, ids: &[i32]) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Paginated listing with optional case-insensitive title search
    pub async fn list(&self, query: &BookQuery) -> AppResult<BookPage> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, MAX_PER_PAGE);
        let pattern = query
            .search
            .as_deref()
            .map(|s| format!("%{}%", s))
            .unwrap_or_else(|| "%".to_string());

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE title ILIKE $1")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let books = sqlx::query_as::<_, BookDetails>(
            r#"
            SELECT b.id, b.title, b.author_id, a.name as author_name,
                   b.publisher_id, p.name as publisher_name,
                   b.quantity, b.available, b.crea_date, b.modif_date
            FROM books b
            LEFT JOIN authors a ON b.author_id = a.id
            LEFT JOIN publishers p ON b.publisher_id = p.id
            WHERE b.title ILIKE $1
            ORDER BY b.title
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        Ok(BookPage {
            books,
            total,
            page,
            per_page,
        })
    }

    /// Check if a book title already exists
    pub async fn title_exists(&self, title: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM books WHERE LOWER(title) = LOWER($1) AND id != $2)",
            )
            .bind(title)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE LOWER(title) = LOWER($1))")
                .bind(title)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a book; all initial copies start available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, publisher_id, quantity, available)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(book.publisher_id)
        .bind(book.quantity)
        .fetch_one(&self.pool)
        .await?;
        Ok(book)
    }

    /// Update book metadata; the counters are never touched here
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author_id = COALESCE($3, author_id),
                publisher_id = COALESCE($4, publisher_id),
                modif_date = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(book.author_id)
        .bind(book.publisher_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
        Ok(book)
    }

    /// Delete a book; historical reservation lines keep their title snapshot
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // Stock ledger
    // =========================================================================

    /// Load a book's counters under a row lock
    pub async fn stock_for_update(&self, conn: &mut PgConnection, id: i32) -> AppResult<StockLevel> {
        let row = sqlx::query_as::<_, (i32, i32)>(
            "SELECT quantity, available FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(StockLevel {
            quantity: row.0,
            available: row.1,
        })
    }

    /// Write back counters previously loaded with `stock_for_update`
    pub async fn write_stock(
        &self,
        conn: &mut PgConnection,
        id: i32,
        level: StockLevel,
    ) -> AppResult<()> {
        sqlx::query("UPDATE books SET quantity = $2, available = $3, modif_date = NOW() WHERE id = $1")
            .bind(id)
            .bind(level.quantity)
            .bind(level.available)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Check out copies of a book (available decreases)
    pub async fn checkout_copies(
        &self,
        conn: &mut PgConnection,
        id: i32,
        amount: i32,
    ) -> AppResult<()> {
        let mut level = self.stock_for_update(conn, id).await?;
        level.checkout(amount)?;
        self.write_stock(conn, id, level).await
    }

    /// Put checked-out copies back on the shelf (available increases)
    pub async fn shelf_return_copies(
        &self,
        conn: &mut PgConnection,
        id: i32,
        amount: i32,
    ) -> AppResult<()> {
        let mut level = self.stock_for_update(conn, id).await?;
        level.shelf_return(amount)?;
        self.write_stock(conn, id, level).await
    }

    /// Stock receipt: grow both quantity and available
    pub async fn receive_stock(
        &self,
        conn: &mut PgConnection,
        id: i32,
        amount: i32,
    ) -> AppResult<StockLevel> {
        let mut level = self.stock_for_update(conn, id).await?;
        level.receive(amount)?;
        self.write_stock(conn, id, level).await?;
        Ok(level)
    }

    /// Stock removal: shrink both quantity and available
    pub async fn remove_stock(
        &self,
        conn: &mut PgConnection,
        id: i32,
        amount: i32,
    ) -> AppResult<StockLevel> {
        let mut level = self.stock_for_update(conn, id).await?;
        level.remove(amount)?;
        self.write_stock(conn, id, level).await?;
        Ok(level)
    }

    // =========================================================================
    // Authors & publishers
    // =========================================================================

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(authors)
    }

    pub async fn create_author(&self, name: &str) -> AppResult<Author> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE LOWER(name) = LOWER($1))")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            return Err(AppError::Conflict(format!("Author '{}' already exists", name)));
        }

        let author =
            sqlx::query_as::<_, Author>("INSERT INTO authors (name) VALUES ($1) RETURNING *")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(author)
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn list_publishers(&self) -> AppResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(publishers)
    }

    pub async fn create_publisher(&self, name: &str) -> AppResult<Publisher> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM publishers WHERE LOWER(name) = LOWER($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        if exists {
            return Err(AppError::Conflict(format!(
                "Publisher '{}' already exists",
                name
            )));
        }

        let publisher =
            sqlx::query_as::<_, Publisher>("INSERT INTO publishers (name) VALUES ($1) RETURNING *")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(publisher)
    }

    pub async fn delete_publisher(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Publisher with id {} not found",
                id
            )));
        }
        Ok(())
    }
}

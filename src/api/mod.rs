//! REST API surface consumed by the client.
//!
//! [`CatalogApi`] lists every backend operation; [`HttpCatalogApi`] is the
//! `reqwest` implementation. Services only depend on the trait so tests can
//! substitute mocks or fakes.

pub mod http;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Author, Book, CreateAuthor, CreateBook, SearchResult, UpdateAuthor, UpdateBook},
};

pub use http::HttpCatalogApi;

/// Books and authors backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /books`
    async fn list_books(&self) -> AppResult<Vec<Book>>;

    /// `GET /books/{id}`
    async fn get_book(&self, id: i32) -> AppResult<Book>;

    /// `GET /books/isbn/{isbn}`
    async fn get_book_by_isbn(&self, isbn: &str) -> AppResult<Book>;

    /// `POST /books`
    async fn create_book(&self, book: &CreateBook) -> AppResult<Book>;

    /// `PUT /books/{id}`
    async fn update_book(&self, id: i32, book: &UpdateBook) -> AppResult<Book>;

    /// `DELETE /books/{id}`
    async fn delete_book(&self, id: i32) -> AppResult<()>;

    /// `POST /books/import/isbn/{isbn}`. The server resolves or creates the
    /// author and publisher, fetches metadata and persists the book.
    async fn import_book(&self, isbn: &str) -> AppResult<Book>;

    /// `GET /books/search?title={q}&maxResults={n}`. Proxies the external
    /// catalog; nothing is persisted.
    async fn search_books(&self, title: &str, max_results: u32) -> AppResult<Vec<SearchResult>>;

    /// `GET /authors`
    async fn list_authors(&self) -> AppResult<Vec<Author>>;

    /// `GET /authors/{id}`
    async fn get_author(&self, id: i32) -> AppResult<Author>;

    /// `POST /authors`
    async fn create_author(&self, author: &CreateAuthor) -> AppResult<Author>;

    /// `PUT /authors/{id}`
    async fn update_author(&self, id: i32, author: &UpdateAuthor) -> AppResult<Author>;

    /// `DELETE /authors/{id}`
    async fn delete_author(&self, id: i32) -> AppResult<()>;
}

//! Catalog service: shared book and author snapshots.
//!
//! The lists are fetched once at start and refetched after every mutation.
//! Callers never patch the snapshots locally.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    api::CatalogApi,
    error::{AppResult, Notice},
    models::{Author, Book, CreateAuthor, UpdateAuthor},
};

use super::request::{RequestState, Settled};

#[derive(Clone)]
pub struct CatalogService {
    api: Arc<dyn CatalogApi>,
    books: Arc<RwLock<RequestState<Vec<Book>>>>,
    authors: Arc<RwLock<RequestState<Vec<Author>>>>,
}

impl CatalogService {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            books: Arc::new(RwLock::new(RequestState::new())),
            authors: Arc::new(RwLock::new(RequestState::new())),
        }
    }

    /// Refetch books and authors concurrently. Returns the first failure,
    /// after both requests have settled.
    pub async fn refresh(&self) -> AppResult<()> {
        let (books, authors) = tokio::join!(self.refresh_books(), self.refresh_authors());
        books.and(authors)
    }

    pub async fn refresh_books(&self) -> AppResult<()> {
        let ticket = self.books.write().await.begin();
        let result = self.api.list_books().await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        if let Ok(books) = &result {
            tracing::debug!("Fetched {} books", books.len());
        }
        if self.books.write().await.settle(ticket, result) == Settled::Stale {
            tracing::debug!("Discarding superseded book list");
        }
        outcome
    }

    pub async fn refresh_authors(&self) -> AppResult<()> {
        let ticket = self.authors.write().await.begin();
        let result = self.api.list_authors().await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        if let Ok(authors) = &result {
            tracing::debug!("Fetched {} authors", authors.len());
        }
        if self.authors.write().await.settle(ticket, result) == Settled::Stale {
            tracing::debug!("Discarding superseded author list");
        }
        outcome
    }

    /// Last fetched books (empty before the first successful fetch)
    pub async fn books(&self) -> Vec<Book> {
        self.books.read().await.snapshot().unwrap_or_default()
    }

    /// Last fetched authors (empty before the first successful fetch)
    pub async fn authors(&self) -> Vec<Author> {
        self.authors.read().await.snapshot().unwrap_or_default()
    }

    pub async fn is_loading(&self) -> bool {
        self.books.read().await.is_loading() || self.authors.read().await.is_loading()
    }

    /// Error of the last list fetch, if it failed
    pub async fn last_error(&self) -> Option<Notice> {
        let books = self.books.read().await.error().cloned();
        match books {
            Some(notice) => Some(notice),
            None => self.authors.read().await.error().cloned(),
        }
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.api.get_book(id).await
    }

    pub async fn get_book_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        self.api.get_book_by_isbn(isbn.trim()).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.api.get_author(id).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.api.delete_book(id).await?;
        self.refresh().await
    }

    pub async fn create_author(&self, name: &str) -> AppResult<Author> {
        let author = self
            .api
            .create_author(&CreateAuthor {
                name: name.trim().to_string(),
            })
            .await?;
        self.refresh_authors().await?;
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, name: &str) -> AppResult<Author> {
        let author = self
            .api
            .update_author(
                id,
                &UpdateAuthor {
                    name: name.trim().to_string(),
                },
            )
            .await?;
        // Books embed their author, so both lists are stale
        self.refresh().await?;
        Ok(author)
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.api.delete_author(id).await?;
        self.refresh().await
    }
}

//! `reqwest`-backed implementation of [`CatalogApi`]

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::{
    config::ApiConfig,
    error::{AppError, AppResult},
    models::{Author, Book, CreateAuthor, CreateBook, SearchResult, UpdateAuthor, UpdateBook},
};

use super::CatalogApi;

#[derive(Debug, Clone)]
pub struct HttpCatalogApi {
    base_url: Url,
    http: Client,
}

impl HttpCatalogApi {
    /// Build a client for the configured backend. Both the connect and the
    /// overall request timeout come from `config`.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("Invalid API base URL {}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "API base URL {} cannot be used as a base",
                config.base_url
            )));
        }

        let http = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("bookshelf-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config("API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> AppResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!("{} {}", method, url);
        Ok(self.http.request(method, url))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = check(request.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Decode(e.to_string()))
    }

    async fn send_empty(&self, request: RequestBuilder) -> AppResult<()> {
        check(request.send().await?).await?;
        Ok(())
    }
}

/// Turn non-success statuses into typed errors, keeping the server message
async fn check(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let err = AppError::from_status(status, &body);
    tracing::debug!("Request failed with {}: {}", status, err);
    Err(err)
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.send(self.request(Method::GET, &["books"])?).await
    }

    async fn get_book(&self, id: i32) -> AppResult<Book> {
        let id = id.to_string();
        self.send(self.request(Method::GET, &["books", id.as_str()])?).await
    }

    async fn get_book_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        self.send(self.request(Method::GET, &["books", "isbn", isbn])?)
            .await
    }

    async fn create_book(&self, book: &CreateBook) -> AppResult<Book> {
        let created: Book = self
            .send(self.request(Method::POST, &["books"])?.json(book))
            .await?;
        tracing::info!("Created book id={} \"{}\"", created.id, created.title);
        Ok(created)
    }

    async fn update_book(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let path_id = id.to_string();
        let updated: Book = self
            .send(self.request(Method::PUT, &["books", path_id.as_str()])?.json(book))
            .await?;
        tracing::info!("Updated book id={}", updated.id);
        Ok(updated)
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        let path_id = id.to_string();
        self.send_empty(self.request(Method::DELETE, &["books", path_id.as_str()])?)
            .await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    async fn import_book(&self, isbn: &str) -> AppResult<Book> {
        let imported: Book = self
            .send(self.request(Method::POST, &["books", "import", "isbn", isbn])?)
            .await?;
        tracing::info!(
            "Imported ISBN {} as book id={} \"{}\"",
            isbn,
            imported.id,
            imported.title
        );
        Ok(imported)
    }

    async fn search_books(&self, title: &str, max_results: u32) -> AppResult<Vec<SearchResult>> {
        let max_results = max_results.to_string();
        let request = self
            .request(Method::GET, &["books", "search"])?
            .query(&[("title", title), ("maxResults", max_results.as_str())]);
        self.send(request).await
    }

    async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.send(self.request(Method::GET, &["authors"])?).await
    }

    async fn get_author(&self, id: i32) -> AppResult<Author> {
        let id = id.to_string();
        self.send(self.request(Method::GET, &["authors", id.as_str()])?).await
    }

    async fn create_author(&self, author: &CreateAuthor) -> AppResult<Author> {
        let created: Author = self
            .send(self.request(Method::POST, &["authors"])?.json(author))
            .await?;
        tracing::info!("Created author id={} \"{}\"", created.id, created.name);
        Ok(created)
    }

    async fn update_author(&self, id: i32, author: &UpdateAuthor) -> AppResult<Author> {
        let path_id = id.to_string();
        let updated: Author = self
            .send(self.request(Method::PUT, &["authors", path_id.as_str()])?.json(author))
            .await?;
        tracing::info!("Updated author id={}", updated.id);
        Ok(updated)
    }

    async fn delete_author(&self, id: i32) -> AppResult<()> {
        let path_id = id.to_string();
        self.send_empty(self.request(Method::DELETE, &["authors", path_id.as_str()])?)
            .await?;
        tracing::info!("Deleted author id={}", id);
        Ok(())
    }
}

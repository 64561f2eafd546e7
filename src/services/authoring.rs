//! Manual book entry: validation, author resolution, create/update

use std::sync::Arc;

use chrono::{Datelike, Utc};
use validator::{Validate, ValidationError};

use crate::{
    api::CatalogApi,
    error::{AppError, AppResult},
    models::{author, isbn, Author, Book, CreateAuthor, CreateBook, UpdateBook},
};

/// What an open form is doing
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit(Book),
}

impl FormMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit(_))
    }
}

/// Free-text values typed into the book form
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct BookForm {
    #[validate(custom(function = "title_present"))]
    pub title: String,
    #[validate(custom(function = "author_present"))]
    pub author_name: String,
    #[validate(custom(function = "isbn::validate"))]
    pub isbn: String,
    #[validate(custom(function = "plausible_year"))]
    pub year: i32,
    pub publisher_id: Option<i32>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

fn required(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(message.into());
        return Err(err);
    }
    Ok(())
}

fn title_present(value: &str) -> Result<(), ValidationError> {
    required(value, "Title is required")
}

fn author_present(value: &str) -> Result<(), ValidationError> {
    required(value, "Author name is required")
}

fn plausible_year(year: i32) -> Result<(), ValidationError> {
    let latest = Utc::now().year() + 1;
    if (1..=latest).contains(&year) {
        return Ok(());
    }
    let mut err = ValidationError::new("year");
    err.message = Some(format!("Year must be between 1 and {}", latest).into());
    Err(err)
}

impl BookForm {
    /// Prefill from an existing book
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author_name: book.author.name.clone(),
            isbn: book.isbn.clone().unwrap_or_default(),
            year: book.year.unwrap_or_default(),
            publisher_id: book.publisher.as_ref().map(|p| p.id),
            description: book.description().map(str::to_string),
            thumbnail: book.thumbnail().map(str::to_string),
        }
    }
}

#[derive(Clone)]
pub struct AuthoringService {
    api: Arc<dyn CatalogApi>,
}

impl AuthoringService {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    /// Resolve `name` against the fetched authors, creating the author when
    /// no case-insensitive exact match exists. Returns the author id.
    pub async fn resolve_author(&self, name: &str, authors: &[Author]) -> AppResult<i32> {
        if let Some(existing) = author::find_by_name(authors, name) {
            tracing::debug!("Resolved author {:?} to id={}", name, existing.id);
            return Ok(existing.id);
        }
        let created = self
            .api
            .create_author(&CreateAuthor {
                name: name.trim().to_string(),
            })
            .await?;
        Ok(created.id)
    }

    /// Validate the form and create or update the book it describes.
    /// Publishers are never created here.
    pub async fn submit(&self, mode: &FormMode, form: &BookForm, authors: &[Author]) -> AppResult<Book> {
        form.validate().map_err(AppError::from)?;

        let author_id = self.resolve_author(&form.author_name, authors).await?;
        let title = form.title.trim().to_string();
        let isbn = isbn::normalize(&form.isbn);

        match mode {
            FormMode::Create => {
                self.api
                    .create_book(&CreateBook {
                        title,
                        author_id,
                        isbn,
                        year: form.year,
                        publisher_id: form.publisher_id,
                    })
                    .await
            }
            FormMode::Edit(existing) => {
                self.api
                    .update_book(
                        existing.id,
                        &UpdateBook {
                            title,
                            author_id,
                            isbn,
                            year: form.year,
                            publisher_id: form.publisher_id,
                            description: form.description.clone(),
                            thumbnail: form.thumbnail.clone(),
                        },
                    )
                    .await
            }
        }
    }
}

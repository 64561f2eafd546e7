//! Book (persisted record) model and related types.
//!
//! Books are created server-side, either explicitly or through ISBN import.
//! The API always embeds a fully populated author; publisher and details
//! are optional.

use serde::{Deserialize, Serialize};

use super::author::Author;
use super::publisher::Publisher;

/// Nested descriptive details (usually filled by ISBN import)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub small_thumbnail: Option<String>,
}

/// Full book model as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    pub author: Author,
    #[serde(default)]
    pub publisher: Option<Publisher>,
    #[serde(default)]
    pub details: Option<BookDetails>,
}

impl Book {
    pub fn description(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.description.as_deref())
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.thumbnail.as_deref())
    }
}

/// Create book request (`POST /books`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    pub title: String,
    pub author_id: i32,
    pub isbn: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_id: Option<i32>,
}

/// Update book request (`PUT /books/{id}`). Description and thumbnail
/// patch the nested details.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub title: String,
    pub author_id: i32,
    pub isbn: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

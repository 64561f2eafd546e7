//! Author model and related types

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Short book reference carried by authors fetched in bulk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Full author model as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i32,
    pub name: String,
    /// Only present on `GET /authors`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<BookSummary>>,
}

impl Author {
    /// Case-insensitive exact comparison of names, ignoring surrounding
    /// whitespace and Unicode composition differences.
    pub fn name_matches(&self, name: &str) -> bool {
        normalize_name(&self.name) == normalize_name(name)
    }

    pub fn book_count(&self) -> Option<usize> {
        self.books.as_ref().map(Vec::len)
    }
}

/// Normalized form used for author name matching
pub fn normalize_name(name: &str) -> String {
    name.trim().nfc().collect::<String>().to_lowercase()
}

/// Find an author by name in an already-fetched list
pub fn find_by_name<'a>(authors: &'a [Author], name: &str) -> Option<&'a Author> {
    let wanted = normalize_name(name);
    authors.iter().find(|a| normalize_name(&a.name) == wanted)
}

/// Create author request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAuthor {
    pub name: String,
}

/// Update author request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateAuthor {
    pub name: String,
}

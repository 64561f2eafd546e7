//! Live catalog search results (transient, never persisted)

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// One hit from `GET /books/search`
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    /// The catalog sometimes sends the year as a string
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl SearchResult {
    /// Identifier usable for import, if the hit carries a non-blank one
    pub fn importable_isbn(&self) -> Option<&str> {
        self.isbn
            .as_deref()
            .map(str::trim)
            .filter(|isbn| !isbn.is_empty())
    }

    /// One-line label for dropdown rendering
    pub fn label(&self) -> String {
        let mut label = self.title.clone();
        if !self.authors.is_empty() {
            label.push_str(" - ");
            label.push_str(&self.authors.join(", "));
        }
        if let Some(year) = self.year {
            label.push_str(&format!(" ({})", year));
        }
        label
    }
}

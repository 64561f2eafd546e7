//! Data models for the Bookshelf client

pub mod author;
pub mod book;
pub mod isbn;
pub mod publisher;
pub mod search;

// Re-export commonly used types
pub use author::{Author, BookSummary, CreateAuthor, UpdateAuthor};
pub use book::{Book, BookDetails, CreateBook, UpdateBook};
pub use publisher::Publisher;
pub use search::SearchResult;

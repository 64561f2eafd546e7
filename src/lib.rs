//! Bookshelf client
//!
//! Headless client for a books/authors REST API: shared catalog snapshots,
//! incremental catalog search with one-click ISBN import, and manual book
//! entry with author resolution.

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use session::Session;

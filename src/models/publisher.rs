//! Publisher model

use serde::{Deserialize, Serialize};

/// Publisher linked to a book. Publishers are only created server-side,
/// during ISBN import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: i32,
    pub name: String,
}

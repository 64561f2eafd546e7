//! Growable top-N result window for live catalog search

use crate::config::SearchConfig;

/// Current query text and result-count ceiling.
///
/// The ceiling starts at `page_size`, grows by `page_size` per load-more and
/// never exceeds `max_results`. Growing refetches the whole top-N window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWindow {
    text: String,
    ceiling: u32,
    can_load_more: bool,
    page_size: u32,
    max_results: u32,
}

impl QueryWindow {
    pub fn new(text: impl Into<String>, config: &SearchConfig) -> Self {
        let page_size = config.page_size.max(1);
        let max_results = config.max_results.max(page_size);
        Self {
            text: text.into(),
            ceiling: page_size,
            can_load_more: false,
            page_size,
            max_results,
        }
    }

    /// Switch to a new query. The ceiling resets only when the text
    /// actually changes. Returns whether it changed.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text.to_string();
        self.ceiling = self.page_size;
        self.can_load_more = false;
        true
    }

    /// Raise the ceiling by one page, capped at the maximum. Returns false
    /// when already at the maximum.
    pub fn grow(&mut self) -> bool {
        if self.ceiling >= self.max_results {
            return false;
        }
        self.ceiling = (self.ceiling + self.page_size).min(self.max_results);
        self.can_load_more = false;
        true
    }

    /// Record how many results the last request returned
    pub fn record_response(&mut self, len: usize) {
        self.can_load_more = len == self.ceiling as usize && self.ceiling < self.max_results;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn can_load_more(&self) -> bool {
        self.can_load_more
    }
}

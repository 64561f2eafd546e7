//! Search & import state machine.
//!
//! Pure and synchronous: every [`SearchEvent`] updates the state and yields
//! the [`SearchCommand`]s the driver has to carry out (timers, requests,
//! notices). Request outcomes come back as events tagged with the ticket
//! they were dispatched with.

use crate::{
    config::SearchConfig,
    error::{AppError, AppResult, Notice},
    models::{Book, SearchResult},
    services::request::{RequestState, Settled, Ticket},
};

use super::window::QueryWindow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// No query, dropdown closed
    #[default]
    Idle,
    /// Debounced query in flight
    Searching,
    /// Dropdown open
    ResultsShown,
    /// A result was selected and its import is in flight
    Importing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    InputChanged(String),
    Debounced(String),
    Focus,
    Blur,
    BlurElapsed(u64),
    Key(NavKey),
    Select(usize),
    LoadMore,
    Close,
    SearchCompleted {
        ticket: Ticket,
        result: AppResult<Vec<SearchResult>>,
    },
    ImportCompleted {
        ticket: Ticket,
        result: AppResult<Book>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchCommand {
    /// Feed the debounce timer
    Debounce(String),
    /// Drop any pending debounced value
    CancelDebounce,
    Search {
        ticket: Ticket,
        title: String,
        max_results: u32,
    },
    Import {
        ticket: Ticket,
        isbn: String,
    },
    /// Deliver `BlurElapsed` after the grace period
    ScheduleBlur(u64),
    /// Surface an error to the user
    Notify(Notice),
    /// Hand the persisted book to the caller
    Imported(Book),
}

/// Read-only snapshot for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
    pub phase: Phase,
    pub input: String,
    pub results: Vec<SearchResult>,
    pub cursor: Option<usize>,
    pub ceiling: Option<u32>,
    pub can_load_more: bool,
    pub editing: bool,
}

#[derive(Debug)]
pub struct SearchMachine {
    config: SearchConfig,
    editing: bool,
    phase: Phase,
    input: String,
    focused: bool,
    window: Option<QueryWindow>,
    search: RequestState<Vec<SearchResult>>,
    import: RequestState<Book>,
    cursor: Option<usize>,
    blur_generation: u64,
}

impl SearchMachine {
    /// `editing` is true when the form edits an existing book; such forms
    /// never search.
    pub fn new(config: SearchConfig, editing: bool) -> Self {
        Self {
            config,
            editing,
            phase: Phase::Idle,
            input: String::new(),
            focused: false,
            window: None,
            search: RequestState::new(),
            import: RequestState::new(),
            cursor: None,
            blur_generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn results(&self) -> &[SearchResult] {
        if self.phase == Phase::Idle {
            return &[];
        }
        self.search.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn window(&self) -> Option<&QueryWindow> {
        self.window.as_ref()
    }

    pub fn view(&self) -> SearchView {
        SearchView {
            phase: self.phase,
            input: self.input.clone(),
            results: self.results().to_vec(),
            cursor: self.cursor,
            ceiling: self.window.as_ref().map(QueryWindow::ceiling),
            can_load_more: self.phase == Phase::ResultsShown
                && self.window.as_ref().is_some_and(QueryWindow::can_load_more),
            editing: self.editing,
        }
    }

    pub fn handle(&mut self, event: SearchEvent) -> Vec<SearchCommand> {
        match event {
            SearchEvent::InputChanged(text) => self.on_input(text),
            SearchEvent::Debounced(text) => self.on_debounced(text),
            SearchEvent::Focus => {
                self.focused = true;
                self.blur_generation += 1;
                Vec::new()
            }
            SearchEvent::Blur => {
                self.focused = false;
                self.blur_generation += 1;
                if self.phase == Phase::Idle {
                    Vec::new()
                } else {
                    vec![SearchCommand::ScheduleBlur(self.blur_generation)]
                }
            }
            SearchEvent::BlurElapsed(generation) => {
                if generation != self.blur_generation || self.focused {
                    return Vec::new();
                }
                self.to_idle();
                vec![SearchCommand::CancelDebounce]
            }
            SearchEvent::Key(key) => self.on_key(key),
            SearchEvent::Select(index) => self.select(index),
            SearchEvent::LoadMore => self.load_more(),
            SearchEvent::Close => {
                self.to_idle();
                self.input.clear();
                self.focused = false;
                vec![SearchCommand::CancelDebounce]
            }
            SearchEvent::SearchCompleted { ticket, result } => {
                self.on_search_completed(ticket, result)
            }
            SearchEvent::ImportCompleted { ticket, result } => {
                self.on_import_completed(ticket, result)
            }
        }
    }

    fn on_input(&mut self, text: String) -> Vec<SearchCommand> {
        self.input = text;
        if self.input.trim().is_empty() {
            self.to_idle();
            return vec![SearchCommand::CancelDebounce];
        }
        if self.editing {
            return Vec::new();
        }
        vec![SearchCommand::Debounce(self.input.clone())]
    }

    fn on_debounced(&mut self, text: String) -> Vec<SearchCommand> {
        if self.editing
            || !self.focused
            || self.phase == Phase::Importing
            || text.trim().is_empty()
            || text != self.input
        {
            return Vec::new();
        }

        match self.window.as_mut() {
            Some(window) => {
                let changed = window.set_text(&text);
                if !changed && matches!(self.phase, Phase::Searching | Phase::ResultsShown) {
                    return Vec::new();
                }
            }
            None => self.window = Some(QueryWindow::new(text, &self.config)),
        }
        self.dispatch_search()
    }

    fn dispatch_search(&mut self) -> Vec<SearchCommand> {
        let Some(window) = self.window.as_ref() else {
            return Vec::new();
        };
        let title = window.text().to_string();
        let max_results = window.ceiling();
        let ticket = self.search.begin();
        self.phase = Phase::Searching;
        tracing::debug!("Searching catalog for {:?} (max {})", title, max_results);
        vec![SearchCommand::Search {
            ticket,
            title,
            max_results,
        }]
    }

    fn on_search_completed(
        &mut self,
        ticket: Ticket,
        result: AppResult<Vec<SearchResult>>,
    ) -> Vec<SearchCommand> {
        let failure = result.as_ref().err().cloned();
        if self.search.settle(ticket, result) == Settled::Stale {
            tracing::debug!("Discarding stale search response");
            return Vec::new();
        }

        if let Some(e) = failure {
            // Search-as-you-type failures are transient; the next keystroke retries.
            tracing::debug!("Catalog search failed: {}", e);
            self.to_idle();
            return Vec::new();
        }

        let len = self.search.data().map_or(0, Vec::len);
        if let Some(window) = self.window.as_mut() {
            window.record_response(len);
        }
        if self.cursor.is_some_and(|i| i >= len) {
            self.cursor = None;
        }
        self.phase = Phase::ResultsShown;
        Vec::new()
    }

    fn load_more(&mut self) -> Vec<SearchCommand> {
        if self.phase != Phase::ResultsShown {
            return Vec::new();
        }
        let grown = match self.window.as_mut() {
            Some(window) if window.can_load_more() => window.grow(),
            _ => false,
        };
        if !grown {
            return Vec::new();
        }
        self.dispatch_search()
    }

    fn on_key(&mut self, key: NavKey) -> Vec<SearchCommand> {
        if key == NavKey::Escape {
            self.to_idle();
            return vec![SearchCommand::CancelDebounce];
        }
        if self.phase != Phase::ResultsShown {
            return Vec::new();
        }
        let len = self.results().len();
        match key {
            NavKey::Down if len > 0 => {
                self.cursor = Some(match self.cursor {
                    Some(i) => (i + 1) % len,
                    None => 0,
                });
                Vec::new()
            }
            NavKey::Up if len > 0 => {
                self.cursor = Some(match self.cursor {
                    Some(0) | None => len - 1,
                    Some(i) => i - 1,
                });
                Vec::new()
            }
            NavKey::Enter => match self.cursor {
                Some(index) => self.select(index),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn select(&mut self, index: usize) -> Vec<SearchCommand> {
        if self.phase != Phase::ResultsShown {
            return Vec::new();
        }
        let Some(hit) = self.results().get(index) else {
            return Vec::new();
        };
        let isbn = hit.importable_isbn().map(str::to_string);
        let title = hit.title.clone();
        self.cursor = Some(index);

        match isbn {
            None => {
                tracing::warn!("Selected result {:?} has no ISBN", title);
                vec![SearchCommand::Notify(AppError::MissingIdentifier.to_notice())]
            }
            Some(isbn) => {
                let ticket = self.import.begin();
                self.phase = Phase::Importing;
                tracing::debug!("Importing {:?} by ISBN {}", title, isbn);
                vec![SearchCommand::Import { ticket, isbn }]
            }
        }
    }

    fn on_import_completed(&mut self, ticket: Ticket, result: AppResult<Book>) -> Vec<SearchCommand> {
        let current = self.import.is_current(ticket);
        match result {
            Ok(book) => {
                let mut commands = Vec::new();
                if current {
                    self.import.settle(ticket, Ok(book.clone()));
                    self.to_idle();
                    self.input.clear();
                    commands.push(SearchCommand::CancelDebounce);
                } else {
                    tracing::debug!("Import of book id={} finished after the dropdown closed", book.id);
                }
                // The record exists server-side either way; the caller must refresh.
                commands.push(SearchCommand::Imported(book));
                commands
            }
            Err(e) => {
                tracing::warn!("Import failed: {}", e);
                if current {
                    self.import.settle(ticket, Err(e.clone()));
                    self.phase = Phase::ResultsShown;
                }
                vec![SearchCommand::Notify(e.to_notice())]
            }
        }
    }

    fn to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.window = None;
        self.cursor = None;
        self.search.reset();
        self.import.invalidate();
    }
}

//! Request state primitive.
//!
//! Tracks the result, error and in-flight flag of one logical request. Each
//! run is identified by a [`Ticket`]; only the latest ticket may settle the
//! state, so a late response from a superseded run is discarded instead of
//! overwriting newer data. Network calls themselves are not aborted.

use crate::error::{AppResult, Notice};

/// Identifies one run of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Outcome of [`RequestState::settle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct RequestState<T> {
    data: Option<T>,
    error: Option<Notice>,
    loading: bool,
    generation: u64,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            generation: 0,
        }
    }
}

impl<T> RequestState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run: clears the previous error, marks in-flight and
    /// supersedes any earlier ticket.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.error = None;
        self.loading = true;
        Ticket(self.generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Apply the outcome of a run if its ticket is still current
    pub fn settle(&mut self, ticket: Ticket, result: AppResult<T>) -> Settled {
        if !self.is_current(ticket) {
            return Settled::Stale;
        }
        match result {
            Ok(data) => self.data = Some(data),
            Err(e) => self.error = Some(e.to_notice()),
        }
        self.loading = false;
        Settled::Applied
    }

    /// Supersede any in-flight run without starting a new one. Used on
    /// teardown so late completions change nothing.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.loading = false;
    }

    /// Forget data and error, superseding in-flight runs
    pub fn reset(&mut self) {
        self.invalidate();
        self.data = None;
        self.error = None;
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&Notice> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl<T: Clone> RequestState<T> {
    /// Clone of the last successful result
    pub fn snapshot(&self) -> Option<T> {
        self.data.clone()
    }
}

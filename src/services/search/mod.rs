//! Incremental catalog search & ISBN import controller.
//!
//! [`SearchController`] runs a [`SearchMachine`] on its own task. User
//! events arrive through the handle methods, request completions and timer
//! expiries are fed back as internal events, and every transition publishes
//! a fresh [`SearchView`]. Successful imports are delivered on the receiver
//! returned by [`SearchController::spawn`].

pub mod machine;
pub mod window;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::{api::CatalogApi, config::SearchConfig, models::Book};

use super::{debounce::Debouncer, notifications::Notifications};

pub use machine::{NavKey, Phase, SearchCommand, SearchEvent, SearchMachine, SearchView};
pub use window::QueryWindow;

pub struct SearchController {
    events: mpsc::UnboundedSender<SearchEvent>,
    view: watch::Receiver<SearchView>,
    task: JoinHandle<()>,
}

struct Driver {
    api: Arc<dyn CatalogApi>,
    notifications: Notifications,
    blur_grace: Duration,
    debouncer: Debouncer<String>,
    internal: mpsc::UnboundedSender<SearchEvent>,
    imported: mpsc::UnboundedSender<Book>,
}

impl SearchController {
    /// Start a controller for one open form. `editing` disables searching.
    pub fn spawn(
        api: Arc<dyn CatalogApi>,
        config: &SearchConfig,
        editing: bool,
        notifications: Notifications,
    ) -> (Self, mpsc::UnboundedReceiver<Book>) {
        let machine = SearchMachine::new(config.clone(), editing);
        let (view_tx, view) = watch::channel(machine.view());
        let (events, events_rx) = mpsc::unbounded_channel();
        let (imported_tx, imported_rx) = mpsc::unbounded_channel();

        let debounce = config.debounce();
        let blur_grace = config.blur_grace();
        let task = tokio::spawn(async move {
            let (debouncer, settled) = Debouncer::new(debounce);
            let (internal, internal_rx) = mpsc::unbounded_channel();
            let driver = Driver {
                api,
                notifications,
                blur_grace,
                debouncer,
                internal,
                imported: imported_tx,
            };
            driver
                .run(machine, events_rx, internal_rx, settled, view_tx)
                .await;
        });

        (Self { events, view, task }, imported_rx)
    }

    fn send(&self, event: SearchEvent) {
        let _ = self.events.send(event);
    }

    /// New value of the text input
    pub fn input(&self, text: impl Into<String>) {
        self.send(SearchEvent::InputChanged(text.into()));
    }

    pub fn focus(&self) {
        self.send(SearchEvent::Focus);
    }

    pub fn blur(&self) {
        self.send(SearchEvent::Blur);
    }

    pub fn key(&self, key: NavKey) {
        self.send(SearchEvent::Key(key));
    }

    /// Pointer selection of a dropdown entry
    pub fn select(&self, index: usize) {
        self.send(SearchEvent::Select(index));
    }

    pub fn load_more(&self) {
        self.send(SearchEvent::LoadMore);
    }

    pub fn close(&self) {
        self.send(SearchEvent::Close);
    }

    /// Latest published state
    pub fn view(&self) -> SearchView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view.clone()
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl Driver {
    async fn run(
        self,
        mut machine: SearchMachine,
        mut events: mpsc::UnboundedReceiver<SearchEvent>,
        mut internal: mpsc::UnboundedReceiver<SearchEvent>,
        mut settled: mpsc::UnboundedReceiver<String>,
        view: watch::Sender<SearchView>,
    ) {
        loop {
            let event = tokio::select! {
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
                Some(event) = internal.recv() => event,
                Some(text) = settled.recv() => SearchEvent::Debounced(text),
            };

            for command in machine.handle(event) {
                self.execute(command);
            }
            view.send_replace(machine.view());
        }
        tracing::debug!("Search controller stopped");
    }

    fn execute(&self, command: SearchCommand) {
        match command {
            SearchCommand::Debounce(text) => self.debouncer.push(text),
            SearchCommand::CancelDebounce => self.debouncer.cancel(),
            SearchCommand::Search {
                ticket,
                title,
                max_results,
            } => {
                let api = self.api.clone();
                let internal = self.internal.clone();
                tokio::spawn(async move {
                    let result = api.search_books(&title, max_results).await;
                    let _ = internal.send(SearchEvent::SearchCompleted { ticket, result });
                });
            }
            SearchCommand::Import { ticket, isbn } => {
                let api = self.api.clone();
                let internal = self.internal.clone();
                tokio::spawn(async move {
                    let result = api.import_book(&isbn).await;
                    let _ = internal.send(SearchEvent::ImportCompleted { ticket, result });
                });
            }
            SearchCommand::ScheduleBlur(generation) => {
                let internal = self.internal.clone();
                let grace = self.blur_grace;
                tokio::spawn(async move {
                    tokio::time::sleep(grace).await;
                    let _ = internal.send(SearchEvent::BlurElapsed(generation));
                });
            }
            SearchCommand::Notify(notice) => {
                self.notifications.error(notice);
            }
            SearchCommand::Imported(book) => {
                if self.imported.send(book).is_err() {
                    tracing::warn!("Imported book dropped: no listener");
                }
            }
        }
    }
}

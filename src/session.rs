//! Application session: owns the services and the currently open form, and
//! reacts to what the form produces (imports, manual saves).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::Book,
    services::{
        authoring::{BookForm, FormMode},
        modal::ModalGuard,
        search::{Phase, SearchController},
        Services,
    },
};

/// Extra wait on top of the request timeout for an import abandoned by
/// closing its form
const IMPORT_GRACE: Duration = Duration::from_secs(1);

struct OpenForm {
    mode: FormMode,
    search: SearchController,
    imported: mpsc::UnboundedReceiver<Book>,
    _modal: ModalGuard,
}

pub struct Session {
    config: Arc<AppConfig>,
    services: Services,
    form: Option<OpenForm>,
}

impl Session {
    pub fn new(config: Arc<AppConfig>, services: Services) -> Self {
        Self {
            config,
            services,
            form: None,
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Initial fetch of the book and author lists
    pub async fn start(&self) -> AppResult<()> {
        self.refresh().await
    }

    /// Refetch the shared lists, surfacing a failure as a notification
    pub async fn refresh(&self) -> AppResult<()> {
        let result = self.services.catalog.refresh().await;
        if let Err(e) = &result {
            tracing::warn!("Failed to refresh catalog: {}", e);
            self.services.notifications.error(e.to_notice());
        }
        result
    }

    /// Open the authoring form. The search input gets focus immediately.
    pub fn open_form(&mut self, mode: FormMode) -> AppResult<&SearchController> {
        if self.form.is_some() {
            return Err(AppError::BusinessRule("A form is already open".to_string()));
        }
        let modal = self.services.modal.acquire();
        let (search, imported) = SearchController::spawn(
            self.services.api.clone(),
            &self.config.search,
            mode.is_edit(),
            self.services.notifications.clone(),
        );
        search.focus();
        tracing::debug!("Opened {} form", if mode.is_edit() { "edit" } else { "create" });

        let form = self.form.insert(OpenForm {
            mode,
            search,
            imported,
            _modal: modal,
        });
        Ok(&form.search)
    }

    /// Close the form, discarding any in-flight search. An import already
    /// sent to the server is awaited in the background and the lists are
    /// refreshed once it lands.
    pub fn close_form(&mut self) {
        let Some(form) = self.form.take() else {
            return;
        };
        let importing = form.search.view().phase == Phase::Importing;
        form.search.close();
        tracing::debug!("Closed form");
        if !importing {
            return;
        }

        let OpenForm {
            search,
            mut imported,
            _modal: modal,
            ..
        } = form;
        drop(modal);
        let catalog = self.services.catalog.clone();
        let wait = self.config.api.timeout() + IMPORT_GRACE;
        tokio::spawn(async move {
            match tokio::time::timeout(wait, imported.recv()).await {
                Ok(Some(book)) => {
                    tracing::info!("Import of book id={} finished after the form closed", book.id);
                    if let Err(e) = catalog.refresh().await {
                        tracing::warn!("Failed to refresh catalog: {}", e);
                    }
                }
                _ => tracing::debug!("Abandoned import produced no book"),
            }
            drop(search);
        });
    }

    pub fn form_mode(&self) -> Option<&FormMode> {
        self.form.as_ref().map(|f| &f.mode)
    }

    pub fn search(&self) -> Option<&SearchController> {
        self.form.as_ref().map(|f| &f.search)
    }

    /// Wait for the open form's next successful import. Never resolves while
    /// no form is open. Cancel-safe.
    pub async fn next_import(&mut self) -> Option<Book> {
        match self.form.as_mut() {
            Some(form) => form.imported.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Import finished: refresh the shared lists and close the form
    pub async fn finish_import(&mut self, book: Book) {
        self.finish_save(&book, "Imported").await;
    }

    /// Submit the manual-entry values of the open form. On failure the form
    /// stays open and the error is surfaced.
    pub async fn submit(&mut self, values: BookForm) -> AppResult<Book> {
        let mode = match self.form.as_ref() {
            Some(form) => form.mode.clone(),
            None => return Err(AppError::BusinessRule("No form is open".to_string())),
        };
        let authors = self.services.catalog.authors().await;

        match self.services.authoring.submit(&mode, &values, &authors).await {
            Ok(book) => {
                let verb = if mode.is_edit() { "Updated" } else { "Created" };
                self.finish_save(&book, verb).await;
                Ok(book)
            }
            Err(e) => {
                tracing::warn!("Saving book failed: {}", e);
                self.services.notifications.error(e.to_notice());
                // The author may have been created before the book call failed
                if !matches!(e, AppError::Validation(_)) {
                    if let Err(refresh) = self.services.catalog.refresh_authors().await {
                        tracing::warn!("Failed to refresh authors: {}", refresh);
                    }
                }
                Err(e)
            }
        }
    }

    async fn finish_save(&mut self, book: &Book, verb: &str) {
        tracing::info!("{} book id={} \"{}\"", verb, book.id, book.title);
        self.close_form();
        self.services
            .notifications
            .success(format!("{} \"{}\"", verb, book.title));
        // Failure is already surfaced; the saved record stays valid
        let _ = self.refresh().await;
    }
}

//! Client-side services

pub mod authoring;
pub mod catalog;
pub mod debounce;
pub mod modal;
pub mod notifications;
pub mod request;
pub mod search;

use std::sync::Arc;

use crate::{api::CatalogApi, config::AppConfig};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn CatalogApi>,
    pub catalog: catalog::CatalogService,
    pub authoring: authoring::AuthoringService,
    pub notifications: notifications::Notifications,
    pub modal: modal::ModalLock,
}

impl Services {
    /// Create all services on top of the given API
    pub fn new(api: Arc<dyn CatalogApi>, config: &AppConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(api.clone()),
            authoring: authoring::AuthoringService::new(api.clone()),
            notifications: notifications::Notifications::new(&config.notifications),
            modal: modal::ModalLock::new(),
            api,
        }
    }
}

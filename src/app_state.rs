//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{SaveManager, SchemeDispatcher};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Dispatcher for internal pages.
    pub dispatcher: Arc<SchemeDispatcher>,
    /// Save manager for all registered saveables.
    pub save_manager: Arc<SaveManager>,
}

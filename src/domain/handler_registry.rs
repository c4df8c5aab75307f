//! Registry mapping page names to handler functions.
//!
//! The registry is built once at startup and immutable afterwards:
//! [`HandlerRegistry::register`] is only reachable before the registry
//! is handed to the dispatcher, and a duplicate page name is a startup
//! configuration error.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;

use super::page_request::PageRequest;
use super::ram_log::RamLog;
use crate::config::SettingsStore;
use crate::error::{GatewayError, PageError};

/// Shared context handed to every page handler.
#[derive(Debug)]
pub struct PageContext {
    /// Settings store, rendered by the `settings` page.
    pub settings: Arc<SettingsStore>,
    /// RAM log, rendered by the `log` pages. `None` when disabled.
    pub ram_log: Option<Arc<RamLog>>,
    /// Root directory the `help` page serves files from.
    pub docs_dir: PathBuf,
    /// Process start time, shown on the `version` page.
    pub started_at: DateTime<Utc>,
}

/// A page handler: renders the page for a request, returning raw bytes.
pub type PageHandler = Arc<
    dyn Fn(Arc<PageContext>, PageRequest) -> BoxFuture<'static, Result<Vec<u8>, PageError>>
        + Send
        + Sync,
>;

/// Immutable mapping from page name to handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, PageHandler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under a page name.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DuplicatePage`] if the name is already
    /// taken. Registration happens at startup only, so this is a fatal
    /// configuration error for the caller.
    pub fn register(&mut self, name: &str, handler: PageHandler) -> Result<(), GatewayError> {
        if self.handlers.contains_key(name) {
            return Err(GatewayError::DuplicatePage(name.to_string()));
        }
        self.handlers.insert(name.to_string(), handler);
        Ok(())
    }

    /// Looks up a handler by exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PageHandler> {
        self.handlers.get(key)
    }

    /// Returns all registered page names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("pages", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use futures_util::FutureExt;

    fn noop_handler() -> PageHandler {
        Arc::new(|_ctx, _req| async { Ok(Vec::new()) }.boxed())
    }

    #[test]
    fn register_and_get() {
        let mut registry = HandlerRegistry::new();
        let Ok(()) = registry.register("version", noop_handler()) else {
            panic!("registration failed");
        };
        assert!(registry.get("version").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let mut registry = HandlerRegistry::new();
        let Ok(()) = registry.register("version", noop_handler()) else {
            panic!("registration failed");
        };
        let result = registry.register("version", noop_handler());
        assert!(matches!(result, Err(GatewayError::DuplicatePage(_))));
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = HandlerRegistry::new();
        for name in ["settings", "help", "version"] {
            let Ok(()) = registry.register(name, noop_handler()) else {
                panic!("registration failed");
            };
        }
        assert_eq!(registry.names(), vec!["help", "settings", "version"]);
    }
}

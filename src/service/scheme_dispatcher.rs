//! Scheme dispatcher: resolves internal-page requests to handlers.
//!
//! A pure lookup-dispatch-translate pipeline with no state beyond the
//! registry: resolve a handler by path then host, invoke it, translate
//! handler failures into [`GatewayError`]s, and tag successful output
//! with a content type inferred from the requested file name.

use std::sync::Arc;

use crate::domain::{HandlerRegistry, PageContext, PagePayload, PageRequest};
use crate::error::{GatewayError, PageError};

/// Fallback content type when nothing can be inferred from the request.
const DEFAULT_MIME: &str = "text/html";

/// Dispatches internal-page requests to registered handlers.
#[derive(Debug)]
pub struct SchemeDispatcher {
    handlers: HandlerRegistry,
    context: Arc<PageContext>,
}

impl SchemeDispatcher {
    /// Creates a dispatcher over a finished handler registry.
    #[must_use]
    pub fn new(handlers: HandlerRegistry, context: Arc<PageContext>) -> Self {
        Self { handlers, context }
    }

    /// Returns the registered page names, sorted.
    #[must_use]
    pub fn page_names(&self) -> Vec<String> {
        self.handlers.names()
    }

    /// Resolves and invokes the handler for a request.
    ///
    /// The request path is tried as a lookup key before the host, so an
    /// URL like `lumen:version` (split as `scheme:path`) resolves the
    /// same page as `lumen://version`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::NoHandler`] when neither path nor host resolves;
    ///   the message carries the request URL.
    /// - [`GatewayError::PageIo`] when the handler hit a recoverable I/O
    ///   failure; the cause is logged and surfaced as not-found.
    /// - [`GatewayError::Page`] when the handler raised a structured
    ///   error; kind and message pass through unchanged.
    pub async fn dispatch(&self, request: PageRequest) -> Result<PagePayload, GatewayError> {
        tracing::debug!(url = %request.url, path = %request.path, host = %request.host, "dispatching");
        let handler = self
            .handlers
            .get(&request.path)
            .or_else(|| self.handlers.get(&request.host))
            .ok_or_else(|| GatewayError::NoHandler(request.url.clone()))?;

        let mime_type = request
            .file_name()
            .and_then(|name| mime_guess::from_path(name).first_raw())
            .unwrap_or(DEFAULT_MIME)
            .to_string();

        let data = match handler(Arc::clone(&self.context), request.clone()).await {
            Ok(data) => data,
            Err(PageError::Io(e)) => {
                tracing::warn!(url = %request.url, error = %e, "page handler I/O failure");
                return Err(GatewayError::PageIo(e.to_string()));
            }
            Err(PageError::Structured { kind, message }) => {
                return Err(GatewayError::Page { kind, message });
            }
        };

        if let Some(ram_log) = &self.context.ram_log {
            ram_log.record(tracing::Level::DEBUG, format!("served {}", request.url));
        }
        Ok(PagePayload { data, mime_type })
    }
}

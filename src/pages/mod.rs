//! Built-in internal pages served through the scheme dispatcher.
//!
//! Each page is an async function over the shared [`PageContext`];
//! [`builtin_registry`] wires them all into a [`HandlerRegistry`] at
//! startup.

pub mod html;

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::domain::{HandlerRegistry, PageContext, PageHandler, PageRequest};
use crate::error::{GatewayError, PageError};

/// Adapts an async page function into a boxed [`PageHandler`].
fn handler<F, Fut>(f: F) -> PageHandler
where
    F: Fn(Arc<PageContext>, PageRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>, PageError>> + Send + 'static,
{
    Arc::new(move |ctx, req| f(ctx, req).boxed())
}

/// Builds the registry of all built-in pages.
///
/// # Errors
///
/// Returns [`GatewayError::DuplicatePage`] if two built-ins share a
/// name, which would be a bug in this function.
pub fn builtin_registry() -> Result<HandlerRegistry, GatewayError> {
    let mut registry = HandlerRegistry::new();
    registry.register("version", handler(version_page))?;
    registry.register("plainlog", handler(plainlog_page))?;
    registry.register("log", handler(log_page))?;
    registry.register("license", handler(license_page))?;
    registry.register("help", handler(help_page))?;
    registry.register("settings", handler(settings_page))?;
    Ok(registry)
}

/// `lumen://version` — crate name, version, and uptime.
async fn version_page(ctx: Arc<PageContext>, _req: PageRequest) -> Result<Vec<u8>, PageError> {
    let uptime = chrono::Utc::now()
        .signed_duration_since(ctx.started_at)
        .num_seconds();
    let body = format!(
        "<h1>Version info</h1>\n<table>\n\
         <tr><td>Name</td><td>{}</td></tr>\n\
         <tr><td>Version</td><td>{}</td></tr>\n\
         <tr><td>Started</td><td>{}</td></tr>\n\
         <tr><td>Uptime</td><td>{uptime}s</td></tr>\n\
         </table>",
        html::escape(env!("CARGO_PKG_NAME")),
        html::escape(env!("CARGO_PKG_VERSION")),
        ctx.started_at.to_rfc3339(),
    );
    Ok(html::page("Version info", &body).into_bytes())
}

/// `lumen://plainlog` — the RAM log as preformatted text.
async fn plainlog_page(ctx: Arc<PageContext>, _req: PageRequest) -> Result<Vec<u8>, PageError> {
    let text = match &ctx.ram_log {
        Some(ram_log) => ram_log.dump_plain(),
        None => "Log output was disabled.".to_string(),
    };
    Ok(html::pre_page("log", &text).into_bytes())
}

/// `lumen://log` — the RAM log as an HTML table.
async fn log_page(ctx: Arc<PageContext>, _req: PageRequest) -> Result<Vec<u8>, PageError> {
    let body = match &ctx.ram_log {
        Some(ram_log) => {
            let rows: String = ram_log
                .entries()
                .iter()
                .map(|e| {
                    format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                        e.timestamp.format("%H:%M:%S"),
                        e.level,
                        html::escape(&e.message)
                    )
                })
                .collect();
            format!("<h1>Log</h1>\n<table>\n{rows}</table>")
        }
        None => "<p>Log output was disabled.</p>".to_string(),
    };
    Ok(html::page("log", &body).into_bytes())
}

/// `lumen://license` — the license text as ASCII bytes.
async fn license_page(_ctx: Arc<PageContext>, _req: PageRequest) -> Result<Vec<u8>, PageError> {
    Ok(html::pre_page("license", include_str!("../../LICENSE")).into_bytes())
}

/// `lumen://help` — serves documentation files from the docs directory.
///
/// An empty path maps to `index.html`. A missing index renders a
/// friendly error page instead of failing, since it usually means the
/// docs were never generated; any other missing file surfaces its I/O
/// error. Paths escaping the docs directory are refused.
async fn help_page(ctx: Arc<PageContext>, req: PageRequest) -> Result<Vec<u8>, PageError> {
    let trimmed = req.path.trim_matches('/');
    let urlpath = if trimmed.is_empty() { "index.html" } else { trimmed };

    if urlpath.split('/').any(|segment| segment == "..") {
        return Err(PageError::denied(format!(
            "refusing to serve {} from outside the documentation directory",
            req.url
        )));
    }

    let full_path = ctx.docs_dir.join(urlpath);
    match tokio::fs::read(&full_path).await {
        Ok(data) => Ok(data),
        Err(e) if urlpath == "index.html" => {
            let body = format!(
                "<h1>Error while loading documentation</h1>\n\
                 <p>Requested: {}</p>\n\
                 <p>This most likely means the documentation was not \
                 generated. Run the docs build and restart the gateway. \
                 ({})</p>",
                html::escape(&req.url),
                html::escape(&e.to_string())
            );
            Ok(html::page("Error while loading documentation", &body).into_bytes())
        }
        Err(e) => Err(PageError::Io(e)),
    }
}

/// `lumen://settings` — the settings store as an HTML table.
async fn settings_page(ctx: Arc<PageContext>, _req: PageRequest) -> Result<Vec<u8>, PageError> {
    let mut rows = String::new();
    for (section, entries) in ctx.settings.snapshot() {
        for (key, value) in entries {
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{value}</td></tr>\n",
                html::escape(&section),
                html::escape(&key)
            ));
        }
    }
    let body = format!(
        "<h1>Settings</h1>\n<table>\n\
         <tr><th>Section</th><th>Key</th><th>Value</th></tr>\n{rows}</table>"
    );
    Ok(html::page("settings", &body).into_bytes())
}

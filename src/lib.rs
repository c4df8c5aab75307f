//! # lumen-gateway
//!
//! Internal-page scheme gateway and state-save coordinator for the
//! Lumen browser shell.
//!
//! Two independent facilities live here: a scheme dispatcher that
//! resolves `lumen:` internal-page requests to registered handlers, and
//! a save manager that tracks per-resource dirty flags and coordinates
//! periodic, explicit, and exit-time saves. The HTTP layer is the host
//! surface that invokes both.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── Page Routes (api/) ──► SchemeDispatcher (service/)
//!     │                              └── HandlerRegistry + built-in pages
//!     │
//!     ├── Save Routes (api/) ──► SaveManager (service/)
//!     │                              └── SaveRegistry + ChangeSignals
//!     │
//!     └── SettingsStore (config/) ── autosave gates
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod pages;
pub mod service;

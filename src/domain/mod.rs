//! Domain layer: page requests, handler registry, saveables, and the
//! change-notification signal.
//!
//! This module contains the server-side domain model: the immutable
//! handler registry for internal pages, the saveable registry with its
//! per-entry dirty flags, the change signal saveables subscribe through,
//! and the RAM log backing the internal log pages.

pub mod change_signal;
pub mod handler_registry;
pub mod page_request;
pub mod ram_log;
pub mod save_registry;
pub mod saveable;

pub use change_signal::ChangeSignal;
pub use handler_registry::{HandlerRegistry, PageContext, PageHandler};
pub use page_request::{PagePayload, PageRequest};
pub use ram_log::RamLog;
pub use save_registry::{SaveRegistry, SaveableSummary};
pub use saveable::{ConfigGate, SaveHandler, Saveable};

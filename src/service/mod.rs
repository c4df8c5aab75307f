//! Service layer: the scheme dispatcher and the save manager.

pub mod save_manager;
pub mod scheme_dispatcher;

pub use save_manager::{SaveFailure, SaveManager, SaveReport};
pub use scheme_dispatcher::SchemeDispatcher;

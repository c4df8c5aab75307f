//! Concurrent saveable storage with per-entry locking.
//!
//! [`SaveRegistry`] stores all registered saveables in a `HashMap` where
//! each entry is individually protected by a [`tokio::sync::Mutex`].
//! Change notifications, timer-driven saves, and exit-driven saves can
//! race, so the outer map lock is held only for lookups and each
//! saveable's flag mutations are serialized by its own lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::saveable::Saveable;
use crate::error::GatewayError;

/// Summary of one registered saveable, for the listing endpoint.
#[derive(Debug, Clone)]
pub struct SaveableSummary {
    /// Saveable name.
    pub name: String,
    /// Whether the saveable has unsaved changes.
    pub dirty: bool,
    /// Whether the saveable is always saved at exit.
    pub save_on_exit: bool,
    /// Time of the last successful save, if any.
    pub last_saved_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Central store for all registered saveables.
///
/// Saveables live for the process lifetime once registered: there is no
/// removal path.
#[derive(Debug, Default)]
pub struct SaveRegistry {
    saveables: RwLock<HashMap<String, Arc<Mutex<Saveable>>>>,
}

impl SaveRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new saveable into the registry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DuplicateSaveable`] if the name is
    /// already registered. Registration happens once at startup, so the
    /// caller should treat this as fatal.
    pub async fn insert(&self, saveable: Saveable) -> Result<(), GatewayError> {
        let name = saveable.name().to_string();
        let mut map = self.saveables.write().await;
        if map.contains_key(&name) {
            return Err(GatewayError::DuplicateSaveable(name));
        }
        map.insert(name, Arc::new(Mutex::new(saveable)));
        Ok(())
    }

    /// Returns a shared reference to the saveable behind its own lock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownSaveable`] if no saveable with the
    /// given name exists.
    pub async fn get(&self, name: &str) -> Result<Arc<Mutex<Saveable>>, GatewayError> {
        let map = self.saveables.read().await;
        map.get(name)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownSaveable(name.to_string()))
    }

    /// Returns all registered names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let map = self.saveables.read().await;
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns summaries of all saveables, sorted by name.
    pub async fn list(&self) -> Vec<SaveableSummary> {
        let map = self.saveables.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.lock().await;
            summaries.push(SaveableSummary {
                name: entry.name().to_string(),
                dirty: entry.is_dirty(),
                save_on_exit: entry.save_on_exit(),
                last_saved_at: entry.last_saved_at(),
            });
        }
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    /// Returns the number of registered saveables.
    pub async fn len(&self) -> usize {
        self.saveables.read().await.len()
    }

    /// Returns `true` if the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.saveables.read().await.is_empty()
    }
}

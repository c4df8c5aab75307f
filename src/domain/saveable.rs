//! A single named unit of application state that can be saved.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::SettingsStore;
use crate::error::GatewayError;

/// Callback invoked to persist a saveable's state.
///
/// Handlers do synchronous file I/O, so [`Saveable::save`] runs them on
/// the blocking thread pool rather than an async worker.
pub type SaveHandler = Arc<dyn Fn() -> std::io::Result<()> + Send + Sync>;

/// A `(section, key)` pair naming the boolean setting that gates
/// implicit autosaves for one saveable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigGate {
    /// Settings section.
    pub section: String,
    /// Settings key within the section.
    pub key: String,
}

impl ConfigGate {
    /// Creates a gate from a section and key.
    #[must_use]
    pub fn new(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
        }
    }
}

/// A named unit of state with a dirty flag and a save callback.
///
/// State machine: `clean → dirty` on a change notification, `dirty →
/// clean` on a successful save. A saveable registered without a change
/// signal has `save_on_exit` set, because its dirtiness cannot be
/// observed and it must always be saved when the process exits.
pub struct Saveable {
    name: String,
    dirty: bool,
    save_on_exit: bool,
    config_gate: Option<ConfigGate>,
    handler: SaveHandler,
    last_saved_at: Option<DateTime<Utc>>,
}

impl Saveable {
    /// Creates a new saveable.
    ///
    /// `tracks_changes` tells whether a change signal is wired up for
    /// this resource; without one the saveable is always saved at exit.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        handler: SaveHandler,
        tracks_changes: bool,
        config_gate: Option<ConfigGate>,
    ) -> Self {
        Self {
            name: name.into(),
            dirty: false,
            save_on_exit: !tracks_changes,
            config_gate,
            handler,
            last_saved_at: None,
        }
    }

    /// Returns the saveable's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the state changed since the last save.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns `true` if this saveable is always saved at exit.
    #[must_use]
    pub fn save_on_exit(&self) -> bool {
        self.save_on_exit
    }

    /// Returns the time of the last successful save, if any.
    #[must_use]
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// Marks this saveable as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        tracing::debug!(name = %self.name, "marking as dirty");
        self.dirty = true;
    }

    /// Saves this saveable if the save policy says so.
    ///
    /// Policy, evaluated in order:
    /// 1. a config gate reading `false` suppresses the save unless
    ///    `explicit` is set;
    /// 2. otherwise save iff dirty, or `save_on_exit` and `is_exit`.
    ///
    /// Returns `Ok(true)` when the handler ran, `Ok(false)` when the
    /// save was skipped. A gate pointing at an unknown setting reads as
    /// enabled. The handler itself runs via
    /// [`tokio::task::spawn_blocking`] so its file I/O never stalls the
    /// async workers.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SaveFailed`] carrying this saveable's
    /// name and the handler's I/O error. The dirty flag is left set so
    /// a later save retries.
    pub async fn save(
        &mut self,
        is_exit: bool,
        explicit: bool,
        settings: &SettingsStore,
    ) -> Result<bool, GatewayError> {
        if let Some(gate) = &self.config_gate {
            let enabled = settings.get_bool(&gate.section, &gate.key).unwrap_or(true);
            if !enabled && !explicit {
                tracing::debug!(
                    name = %self.name,
                    section = %gate.section,
                    key = %gate.key,
                    "not saving, autosave disabled by config"
                );
                return Ok(false);
            }
        }
        let do_save = self.dirty || (self.save_on_exit && is_exit);
        tracing::debug!(
            name = %self.name,
            dirty = self.dirty,
            save_on_exit = self.save_on_exit,
            is_exit,
            do_save,
            "save requested"
        );
        if !do_save {
            return Ok(false);
        }
        let handler = Arc::clone(&self.handler);
        let outcome = tokio::task::spawn_blocking(move || handler())
            .await
            .map_err(|join| GatewayError::Internal(format!("save handler panicked: {join}")))?;
        outcome.map_err(|cause| GatewayError::SaveFailed {
            name: self.name.clone(),
            cause,
        })?;
        self.dirty = false;
        self.last_saved_at = Some(Utc::now());
        Ok(true)
    }
}

impl fmt::Debug for Saveable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Saveable")
            .field("name", &self.name)
            .field("dirty", &self.dirty)
            .field("save_on_exit", &self.save_on_exit)
            .field("config_gate", &self.config_gate)
            .finish_non_exhaustive()
    }
}

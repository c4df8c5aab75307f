//! Save manager: registers saveables and coordinates periodic, explicit,
//! and exit-time saves.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::SettingsStore;
use crate::domain::{ChangeSignal, ConfigGate, SaveHandler, SaveRegistry, Saveable};
use crate::error::GatewayError;

/// One failed resource within a batch save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    /// Name the failure applies to (possibly an unknown name).
    pub name: String,
    /// User-visible error message.
    pub message: String,
}

/// Outcome of a batch save.
///
/// Partial failure across independent resources never aborts the batch:
/// failures are collected here per resource instead of raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Names whose save handler actually ran.
    pub saved: Vec<String>,
    /// Names whose save was skipped by policy (clean, or gated off).
    pub skipped: Vec<String>,
    /// Per-resource failures, including unknown names.
    pub errors: Vec<SaveFailure>,
}

/// Coordinates all registered saveables.
///
/// Owns the [`SaveRegistry`] and the settings store the autosave gates
/// read from. Registration happens once at startup; `save` and
/// `save_all` are invoked by the periodic autosave task, the exit path,
/// and the explicit save command surface.
#[derive(Debug)]
pub struct SaveManager {
    registry: Arc<SaveRegistry>,
    settings: Arc<SettingsStore>,
}

impl SaveManager {
    /// Creates a save manager reading gates from `settings`.
    #[must_use]
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self {
            registry: Arc::new(SaveRegistry::new()),
            settings,
        }
    }

    /// Returns a reference to the inner registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<SaveRegistry> {
        &self.registry
    }

    /// Registers a new saveable.
    ///
    /// With a `changed` signal, a background task subscribes and marks
    /// the saveable dirty on every notification; without one the
    /// saveable is always saved at exit since its dirtiness cannot be
    /// observed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DuplicateSaveable`] if the name is
    /// already registered. Treat as fatal: registration is startup
    /// configuration, not a runtime condition.
    pub async fn register(
        &self,
        name: &str,
        handler: SaveHandler,
        changed: Option<&ChangeSignal>,
        config_gate: Option<ConfigGate>,
    ) -> Result<(), GatewayError> {
        let saveable = Saveable::new(name, handler, changed.is_some(), config_gate);
        self.registry.insert(saveable).await?;
        if let Some(signal) = changed {
            self.spawn_dirty_listener(name.to_string(), signal);
        }
        tracing::info!(name, tracked = changed.is_some(), "saveable registered");
        Ok(())
    }

    fn spawn_dirty_listener(&self, name: String, signal: &ChangeSignal) {
        let mut rx = signal.subscribe();
        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    // A lagged receiver still means changes happened.
                    Ok(()) | Err(RecvError::Lagged(_)) => {
                        if let Ok(entry) = registry.get(&name).await {
                            entry.lock().await.mark_dirty();
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    /// Marks a saveable dirty by name.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownSaveable`] for unregistered names.
    pub async fn mark_dirty(&self, name: &str) -> Result<(), GatewayError> {
        let entry = self.registry.get(name).await?;
        entry.lock().await.mark_dirty();
        Ok(())
    }

    /// Saves a single saveable by name.
    ///
    /// Returns `Ok(true)` when the save handler ran, `Ok(false)` when
    /// the save policy skipped it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownSaveable`] for unregistered names
    /// and [`GatewayError::SaveFailed`] when persistence fails.
    pub async fn save(
        &self,
        name: &str,
        is_exit: bool,
        explicit: bool,
    ) -> Result<bool, GatewayError> {
        let entry = self.registry.get(name).await?;
        let mut saveable = entry.lock().await;
        saveable.save(is_exit, explicit, &self.settings).await
    }

    /// Saves a batch of saveables.
    ///
    /// With `names` absent every registered saveable is targeted and the
    /// saves are implicit; with `names` given exactly those are targeted
    /// and the saves are explicit (bypassing autosave gates). Unknown
    /// names and per-resource failures are reported in the returned
    /// [`SaveReport`] and never abort the rest of the batch.
    pub async fn save_all(&self, names: Option<&[String]>, is_exit: bool) -> SaveReport {
        let (targets, explicit) = match names {
            Some(names) => (names.to_vec(), true),
            None => (self.registry.names().await, false),
        };

        let mut report = SaveReport::default();
        for name in targets {
            match self.save(&name, is_exit, explicit).await {
                Ok(true) => report.saved.push(name),
                Ok(false) => report.skipped.push(name),
                Err(e) => {
                    tracing::warn!(name = %name, error = %e, "save failed");
                    report.errors.push(SaveFailure {
                        name,
                        message: e.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Spawns the periodic autosave task, running an implicit
    /// `save_all` every `interval`.
    pub fn spawn_autosave(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let manager = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so startup
            // doesn't trigger a save before anything changed.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let report = manager.save_all(None, false).await;
                if !report.saved.is_empty() {
                    tracing::debug!(saved = ?report.saved, "autosave cycle");
                }
                for failure in &report.errors {
                    tracing::warn!(name = %failure.name, message = %failure.message, "autosave failure");
                }
            }
        })
    }

    /// Runs the exit save: an implicit `save_all` with `is_exit` set.
    pub async fn shutdown(&self) -> SaveReport {
        let report = self.save_all(None, true).await;
        tracing::info!(
            saved = ?report.saved,
            errors = report.errors.len(),
            "exit save complete"
        );
        report
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manager() -> (Arc<SaveManager>, Arc<SettingsStore>) {
        let settings = Arc::new(SettingsStore::with_defaults(16));
        (Arc::new(SaveManager::new(Arc::clone(&settings))), settings)
    }

    fn counting_handler() -> (SaveHandler, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::clone(&count);
        let handler: SaveHandler = Arc::new(move || {
            count2.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (handler, count)
    }

    #[tokio::test]
    async fn duplicate_registration_is_fatal() {
        let (manager, _) = manager();
        let (handler, _) = counting_handler();
        let Ok(()) = manager.register("config", Arc::clone(&handler), None, None).await else {
            panic!("first registration failed");
        };
        let result = manager.register("config", handler, None, None).await;
        assert!(matches!(result, Err(GatewayError::DuplicateSaveable(_))));
    }

    #[tokio::test]
    async fn change_signal_marks_dirty() {
        let (manager, _) = manager();
        let (handler, count) = counting_handler();
        let signal = ChangeSignal::new(16);
        let Ok(()) = manager.register("history", handler, Some(&signal), None).await else {
            panic!("registration failed");
        };

        signal.notify();
        // Let the listener task observe the notification.
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        let Ok(saved) = manager.save("history", false, false).await else {
            panic!("save errored");
        };
        assert!(saved);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gate_scenario_config_autosave_disabled() {
        // Register "config" gated by (general, autosave)=false, mark
        // dirty: implicit save skips, explicit save runs and cleans.
        let (manager, settings) = manager();
        settings.set_bool("general", "autosave", false);

        let (handler, count) = counting_handler();
        let signal = ChangeSignal::new(16);
        let Ok(()) = manager
            .register(
                "config",
                handler,
                Some(&signal),
                Some(ConfigGate::new("general", "autosave")),
            )
            .await
        else {
            panic!("registration failed");
        };
        let Ok(()) = manager.mark_dirty("config").await else {
            panic!("mark_dirty failed");
        };

        let Ok(saved) = manager.save("config", false, false).await else {
            panic!("implicit save errored");
        };
        assert!(!saved);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        let Ok(saved) = manager.save("config", false, true).await else {
            panic!("explicit save errored");
        };
        assert!(saved);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        let Ok(entry) = manager.registry().get("config").await else {
            panic!("lookup failed");
        };
        assert!(!entry.lock().await.is_dirty());
    }

    #[tokio::test]
    async fn save_all_continues_past_unknown_names() {
        let (manager, _) = manager();
        let (handler, count) = counting_handler();
        let Ok(()) = manager.register("history", handler, None, None).await else {
            panic!("registration failed");
        };
        let Ok(()) = manager.mark_dirty("history").await else {
            panic!("mark_dirty failed");
        };

        let names = vec!["history".to_string(), "bogus".to_string()];
        let report = manager.save_all(Some(&names), false).await;

        assert_eq!(report.saved, vec!["history".to_string()]);
        assert_eq!(report.errors.len(), 1);
        let Some(failure) = report.errors.first() else {
            panic!("missing failure");
        };
        assert_eq!(failure.name, "bogus");
        assert!(failure.message.contains("nothing which can be saved"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn save_all_reports_persistence_failures_per_resource() {
        let (manager, _) = manager();
        let failing: SaveHandler = Arc::new(|| {
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "disk full",
            ))
        });
        let (ok_handler, count) = counting_handler();

        let Ok(()) = manager.register("cookies", failing, None, None).await else {
            panic!("registration failed");
        };
        let Ok(()) = manager.register("history", ok_handler, None, None).await else {
            panic!("registration failed");
        };
        let Ok(()) = manager.mark_dirty("cookies").await else {
            panic!("mark_dirty failed");
        };
        let Ok(()) = manager.mark_dirty("history").await else {
            panic!("mark_dirty failed");
        };

        let report = manager.save_all(None, false).await;
        assert_eq!(report.saved, vec!["history".to_string()]);
        assert_eq!(report.errors.len(), 1);
        let Some(failure) = report.errors.first() else {
            panic!("missing failure");
        };
        assert_eq!(failure.name, "cookies");
        assert!(failure.message.contains("disk full"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn implicit_save_all_targets_everything() {
        let (manager, _) = manager();
        let (h1, c1) = counting_handler();
        let (h2, c2) = counting_handler();
        let signal = ChangeSignal::new(16);

        // Untracked: saves at exit regardless of dirtiness.
        let Ok(()) = manager.register("session", h1, None, None).await else {
            panic!("registration failed");
        };
        // Tracked but never dirtied: must not save, even at exit.
        let Ok(()) = manager.register("history", h2, Some(&signal), None).await else {
            panic!("registration failed");
        };

        let report = manager.save_all(None, true).await;
        assert_eq!(report.saved, vec!["session".to_string()]);
        assert_eq!(report.skipped, vec!["history".to_string()]);
        assert_eq!(c1.load(Ordering::SeqCst), 1);
        assert_eq!(c2.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn autosave_task_saves_dirty_resources() {
        let (manager, _) = manager();
        let (handler, count) = counting_handler();
        let Ok(()) = manager.register("history", handler, None, None).await else {
            panic!("registration failed");
        };
        let Ok(()) = manager.mark_dirty("history").await else {
            panic!("mark_dirty failed");
        };

        let task = Arc::clone(&manager).spawn_autosave(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        // The handler completes on the blocking pool; poll until it has.
        for _ in 0..50 {
            if count.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert_eq!(count.load(Ordering::SeqCst), 1);
        task.abort();
    }
}

//! Gateway configuration loaded from environment variables, plus the
//! boolean settings store consulted by autosave gates.
//!
//! Follows 12-factor style: all deployment settings come from environment
//! variables (or a `.env` file via `dotenvy`). User-facing settings live
//! in [`SettingsStore`], which is itself persisted through the save
//! manager.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use anyhow::Context;

use crate::domain::ChangeSignal;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `127.0.0.1:3000`).
    pub listen_addr: SocketAddr,

    /// Directory the `help` page serves documentation files from.
    pub docs_dir: PathBuf,

    /// File the settings store is persisted to.
    pub settings_path: PathBuf,

    /// File the RAM log is dumped to on exit.
    pub ram_log_path: PathBuf,

    /// Seconds between automatic implicit saves. `0` disables the
    /// autosave task.
    pub autosave_interval_secs: u64,

    /// Maximum number of entries retained by the RAM log.
    pub ram_log_capacity: usize,

    /// Capacity of each change-notification broadcast channel.
    pub change_signal_capacity: usize,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .context("LISTEN_ADDR is not a valid socket address")?;

        let docs_dir = PathBuf::from(
            std::env::var("DOCS_DIR").unwrap_or_else(|_| "docs/html".to_string()),
        );
        let settings_path = PathBuf::from(
            std::env::var("SETTINGS_PATH").unwrap_or_else(|_| "state/settings.json".to_string()),
        );
        let ram_log_path = PathBuf::from(
            std::env::var("RAM_LOG_PATH").unwrap_or_else(|_| "state/ram-log.txt".to_string()),
        );

        let autosave_interval_secs = parse_env("AUTOSAVE_INTERVAL_SECS", 60);
        let ram_log_capacity = parse_env("RAM_LOG_CAPACITY", 2_000);
        let change_signal_capacity = parse_env("CHANGE_SIGNAL_CAPACITY", 64);

        Ok(Self {
            listen_addr,
            docs_dir,
            settings_path,
            ram_log_path,
            autosave_interval_secs,
            ram_log_capacity,
            change_signal_capacity,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// In-memory store of boolean settings, keyed by `(section, key)`.
///
/// This is the configuration collaborator autosave gates read from.
/// Every mutation fires the attached [`ChangeSignal`], so registering
/// the store as a saveable with that signal tracks its dirtiness.
#[derive(Debug)]
pub struct SettingsStore {
    values: RwLock<HashMap<String, HashMap<String, bool>>>,
    changed: ChangeSignal,
}

impl SettingsStore {
    /// Creates a store pre-populated with the default settings.
    #[must_use]
    pub fn with_defaults(signal_capacity: usize) -> Self {
        let store = Self {
            values: RwLock::new(HashMap::new()),
            changed: ChangeSignal::new(signal_capacity),
        };
        store.insert_quiet("general", "auto-save-config", true);
        store.insert_quiet("general", "private-browsing", false);
        store.insert_quiet("content", "allow-javascript", true);
        store
    }

    /// Loads the store from a JSON file, falling back to defaults when
    /// the file does not exist. Settings present in the file override
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path, signal_capacity: usize) -> anyhow::Result<Self> {
        let store = Self::with_defaults(signal_capacity);
        if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading settings from {}", path.display()))?;
            let parsed: BTreeMap<String, BTreeMap<String, bool>> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing settings from {}", path.display()))?;
            for (section, entries) in parsed {
                for (key, value) in entries {
                    store.insert_quiet(&section, &key, value);
                }
            }
        }
        Ok(store)
    }

    /// Reads a boolean setting. Returns `None` for unknown keys.
    #[must_use]
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(section).and_then(|s| s.get(key)).copied()
    }

    /// Writes a boolean setting and fires the change signal.
    pub fn set_bool(&self, section: &str, key: &str, value: bool) {
        self.insert_quiet(section, key, value);
        self.changed.notify();
        tracing::debug!(section, key, value, "setting changed");
    }

    /// Returns the change signal fired on every mutation.
    #[must_use]
    pub fn changed(&self) -> &ChangeSignal {
        &self.changed
    }

    /// Returns a sorted copy of all settings, for rendering and
    /// persistence.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<String, bool>> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values
            .iter()
            .map(|(section, entries)| {
                let entries = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), *v))
                    .collect::<BTreeMap<_, _>>();
                (section.clone(), entries)
            })
            .collect()
    }

    /// Persists the store as pretty-printed JSON, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from directory creation or the write.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let snapshot = self.snapshot();
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        std::fs::write(path, json)
    }

    fn insert_quiet(&self, section: &str, key: &str, value: bool) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_present() {
        let store = SettingsStore::with_defaults(16);
        assert_eq!(store.get_bool("general", "auto-save-config"), Some(true));
        assert_eq!(store.get_bool("general", "no-such-key"), None);
    }

    #[test]
    fn set_bool_fires_change_signal() {
        let store = SettingsStore::with_defaults(16);
        let mut rx = store.changed().subscribe();

        store.set_bool("general", "auto-save-config", false);

        assert_eq!(store.get_bool("general", "auto-save-config"), Some(false));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn round_trips_through_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir creation failed");
        };
        let path = dir.path().join("settings.json");

        let store = SettingsStore::with_defaults(16);
        store.set_bool("general", "private-browsing", true);
        let Ok(()) = store.save_to(&path) else {
            panic!("save failed");
        };

        let Ok(loaded) = SettingsStore::load(&path, 16) else {
            panic!("load failed");
        };
        assert_eq!(loaded.get_bool("general", "private-browsing"), Some(true));
        // Defaults survive for keys absent from the file
        assert_eq!(loaded.get_bool("content", "allow-javascript"), Some(true));
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir creation failed");
        };
        let Ok(store) = SettingsStore::load(&dir.path().join("missing.json"), 16) else {
            panic!("load failed");
        };
        assert_eq!(store.get_bool("general", "auto-save-config"), Some(true));
    }
}

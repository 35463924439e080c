//! Plugin preferences with JSON persistence
//!
//! The settings file is owned by this plugin and validated against a
//! compiled-in default schema: loading never fails outward. Keys that are
//! missing or hold a value of the wrong kind fall back to their defaults
//! individually while valid keys keep their loaded values. Every mutation
//! is written through to disk immediately.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::common::types::Bound;
use crate::constants::{defaults, elements, paths};

/// The full preferences schema, always complete and schema-valid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Input hook key combination registered with the host
    pub hook_key: String,
    /// Style rule inserted for the inline-content element category
    pub css: String,
    /// Body of the inline-content element
    pub basic_content: String,
    /// Page loaded by the embedded-view element
    pub view_url: String,
    /// Placement of the inline-content element
    pub basic_bound: Bound,
    /// Placement of the embedded-view element
    pub view_bound: Bound,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            hook_key: defaults::HOOK_KEY.to_string(),
            css: defaults::CSS.to_string(),
            basic_content: defaults::BASIC_CONTENT.to_string(),
            view_url: defaults::VIEW_URL.to_string(),
            basic_bound: Bound::from_tuple(defaults::BASIC_BOUND),
            view_bound: Bound::from_tuple(defaults::VIEW_BOUND),
        }
    }
}

/// Pull one key out of a loaded JSON object, falling back to the default
/// when the key is absent or its value has the wrong kind
fn field<T: DeserializeOwned>(
    map: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    default: T,
) -> T {
    match map.get(key) {
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(_) => {
                debug!(key, "Settings value has the wrong kind, using default");
                default
            }
        },
        None => default,
    }
}

impl PluginSettings {
    /// Rebuild a complete settings value from arbitrary loaded JSON,
    /// repairing per key against the default schema
    fn repair(value: serde_json::Value) -> Self {
        let d = Self::default();
        let Some(map) = value.as_object() else {
            debug!("Settings file is not a JSON object, using defaults");
            return d;
        };

        Self {
            hook_key: field(map, "hook_key", d.hook_key),
            css: field(map, "css", d.css),
            basic_content: field(map, "basic_content", d.basic_content),
            view_url: field(map, "view_url", d.view_url),
            basic_bound: field(map, "basic_bound", d.basic_bound),
            view_bound: field(map, "view_bound", d.view_bound),
        }
    }
}

/// Owns the settings file and the in-memory settings value
///
/// An explicit instance with an injectable path; independent stores can
/// coexist, which is what the tests rely on.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: PluginSettings,
    saves: u64,
}

impl SettingsStore {
    /// Default settings file location, next to the host config
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(paths::APP_DIR);
        path.push(paths::SETTINGS_FILENAME);
        path
    }

    /// Open the store, loading and repairing the backing file
    ///
    /// A missing or invalid file is replaced by the default schema on disk,
    /// so after `open` the file always exists and parses.
    pub fn open(path: PathBuf) -> Self {
        let (settings, needs_rewrite) = Self::load(&path);
        let mut store = Self {
            path,
            settings,
            saves: 0,
        };
        if needs_rewrite
            && let Err(e) = store.save()
        {
            warn!(error = %e, "Failed to write repaired settings file");
        }
        store
    }

    /// Load and repair; the bool reports whether the on-disk file needs to
    /// be rewritten (absent, unreadable, or not matching what we loaded)
    fn load(path: &Path) -> (PluginSettings, bool) {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<serde_json::Value>(&contents) {
                Ok(value) => {
                    let settings = PluginSettings::repair(value);
                    info!(path = %path.display(), "Loaded plugin settings");
                    (settings, false)
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Settings file is corrupt, using defaults");
                    (PluginSettings::default(), true)
                }
            },
            Err(_) => {
                info!(path = %path.display(), "No settings file, creating defaults");
                (PluginSettings::default(), true)
            }
        }
    }

    /// Current settings value
    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    /// How many times this store has written its file
    pub fn save_count(&self) -> u64 {
        self.saves
    }

    /// Overwrite the backing file with the current settings
    ///
    /// Not transactional: a crash mid-write may corrupt the file. `open`
    /// repairs such a file back to defaults on the next run.
    pub fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }

        let json_string = serde_json::to_string_pretty(&self.settings)
            .context("Failed to serialize settings to JSON")?;

        fs::write(&self.path, json_string)
            .with_context(|| format!("Failed to write settings to {:?}", self.path))?;

        self.saves += 1;
        debug!(path = %self.path.display(), "Saved plugin settings");
        Ok(())
    }

    /// Apply a bound update reported by the host for a well-known element
    /// key, then write through
    ///
    /// Unknown keys leave the settings unchanged; the write-through still
    /// happens once per call.
    pub fn on_bound_update(&mut self, key: &str, bound: Bound) {
        match key {
            elements::BASIC_KEY => self.settings.basic_bound = bound,
            elements::VIEW_KEY => self.settings.view_bound = bound,
            _ => debug!(key, "Bound update for unknown element key ignored"),
        }
        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to persist settings after bound update");
        }
    }
}

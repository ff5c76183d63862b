use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::warn;

/// Fixed key under which the filter panel's show/hide preference is stored.
pub const PANEL_SHOWN_KEY: &str = "filters.panelShown";

/// Persisted boolean preferences. A missing key reads as `None`; the caller
/// decides the default. Writes are single-boolean, last-write-wins.
pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> Option<bool>;
    fn store(&self, key: &str, value: bool);
}

/// In-memory store for tests and ephemeral hosts.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, bool>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &str) -> Option<bool> {
        self.values.lock().get(key).copied()
    }

    fn store(&self, key: &str, value: bool) {
        self.values.lock().insert(key.to_string(), value);
    }
}

/// File-backed store holding a small JSON document of key/boolean pairs.
/// A missing or unreadable file reads as empty; write failures are logged
/// and otherwise ignored so preference persistence can never block the UI.
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> BTreeMap<String, bool> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "ignoring malformed preference file");
                BTreeMap::new()
            }
        }
    }

    fn write_all(&self, values: &BTreeMap<String, bool>) {
        let rendered = match serde_json::to_string_pretty(values) {
            Ok(rendered) => rendered,
            Err(error) => {
                warn!(%error, "failed to serialize preferences");
                return;
            }
        };
        if let Some(parent) = self.path.parent()
            && let Err(error) = fs::create_dir_all(parent)
        {
            warn!(path = %parent.display(), %error, "failed to create preference directory");
            return;
        }
        if let Err(error) = fs::write(&self.path, rendered) {
            warn!(path = %self.path.display(), %error, "failed to write preferences");
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self, key: &str) -> Option<bool> {
        self.read_all().get(key).copied()
    }

    fn store(&self, key: &str, value: bool) {
        let mut values = self.read_all();
        values.insert(key.to_string(), value);
        self.write_all(&values);
    }
}

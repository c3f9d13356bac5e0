use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::utils::errors::{AppError, Result};

pub const LANG_KEY: &str = "lang";
pub const THEME_KEY: &str = "theme";

/// Durable key/value store for user preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Preferences kept in a small TOML file in the user's config directory.
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Open the store. A missing or unreadable file starts empty.
    pub fn open(path: &Path) -> Self {
        let values = match std::fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(values) => values,
                Err(e) => {
                    log::warn!("Ignoring unreadable preferences {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: path.to_path_buf(),
            values,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = toml::to_string(&self.values)
            .map_err(|e| AppError::Preferences(e.to_string()))?;
        std::fs::write(&self.path, raw)?;
        log::debug!("Stored preference {}={} in {}", key, value, self.path.display());
        Ok(())
    }
}

/// Non-durable store, used when no preference file should be touched.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");

        let mut store = FilePreferences::open(&path);
        assert_eq!(store.get(LANG_KEY), None);
        store.set(LANG_KEY, "en").unwrap();
        store.set(THEME_KEY, "dark").unwrap();

        let reopened = FilePreferences::open(&path);
        assert_eq!(reopened.get(LANG_KEY).as_deref(), Some("en"));
        assert_eq!(reopened.get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "lang = [1, 2").unwrap();
        let store = FilePreferences::open(&path);
        assert_eq!(store.get(LANG_KEY), None);
    }
}

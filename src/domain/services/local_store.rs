#[cfg(test)]
#[path = "local_store_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::fs;
use std::path;
use std::sync::Mutex;
use std::sync::PoisonError;

use anyhow::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum StoreKey {
    AuthToken,
    SelectedCourse,
    Theme,
}

/// Small key-value file for state that has to survive restarts. A missing or
/// unreadable file is treated as empty.
pub struct LocalStore {
    file_path: path::PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl LocalStore {
    pub fn open(file_path: path::PathBuf) -> LocalStore {
        let values = match fs::read_to_string(&file_path) {
            Ok(payload) => serde_yaml::from_str::<BTreeMap<String, String>>(&payload)
                .unwrap_or_else(|err| {
                    tracing::warn!(file = ?file_path, error = ?err, "ignoring unreadable state file");
                    return BTreeMap::new();
                }),
            Err(_) => BTreeMap::new(),
        };

        return LocalStore {
            file_path,
            values: Mutex::new(values),
        };
    }

    pub fn get(&self, key: StoreKey) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        return values.get(&key.to_string()).cloned();
    }

    pub fn set(&self, key: StoreKey, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        return self.write(&values);
    }

    pub fn remove(&self, key: StoreKey) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if values.remove(&key.to_string()).is_none() {
            return Ok(());
        }
        return self.write(&values);
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.file_path, serde_yaml::to_string(values)?)?;

        return Ok(());
    }
}

//! File-backed key/value storage for native builds.
//!
//! Each key is one file under the state directory. Writes go to a sibling
//! temp file and are renamed into place, so a record is never observed
//! half-written.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;

use suitegate_auth::{KeyValueStorage, StorageError};

/// Environment variable overriding the state directory.
pub const ENV_STATE_DIR: &str = "SUITEGATE_STATE_DIR";

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create state directory at {:?}", dir))?;
        Ok(Self { dir })
    }

    /// Use [`state_dir`].
    pub fn open_default() -> anyhow::Result<Self> {
        Self::open(state_dir()?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Read {
                key: key.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, value)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|err| StorageError::Write {
                key: key.to_string(),
                reason: err.to_string(),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Write {
                key: key.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

/// Resolve the state directory:
/// `$SUITEGATE_STATE_DIR`, else `{app_data_dir}/suitegate`.
pub fn state_dir() -> anyhow::Result<PathBuf> {
    if let Some(dir) = std::env::var_os(ENV_STATE_DIR) {
        return Ok(PathBuf::from(dir));
    }

    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    dir.push("suitegate");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("suitegate-{name}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn values_survive_reopen() {
        let dir = scratch_dir("reopen");
        let storage = FileStorage::open(&dir).unwrap();

        assert_eq!(storage.get("suite-access").unwrap(), None);
        storage.set("suite-access", r#"{"ops":1}"#).unwrap();
        storage.set("suite-access", r#"{"ops":2}"#).unwrap();

        let reopened = FileStorage::open(&dir).unwrap();
        assert_eq!(reopened.get("suite-access").unwrap().as_deref(), Some(r#"{"ops":2}"#));
        assert!(!dir.join("suite-access.json.tmp").exists());

        reopened.remove("suite-access").unwrap();
        reopened.remove("suite-access").unwrap();
        assert_eq!(reopened.get("suite-access").unwrap(), None);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn keys_cannot_escape_the_directory() {
        let dir = scratch_dir("escape");
        let storage = FileStorage::open(&dir).unwrap();
        assert_eq!(storage.path_for("../../etc/passwd"), dir.join("______etc_passwd.json"));
        fs::remove_dir_all(&dir).unwrap();
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
const TOKEN_FILE_NAME: &str = "tokens.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token store error: {0}")]
    Io(String),
    #[error("token file is corrupt: {0}")]
    Corrupt(String),
    #[error("config directory not found, cannot store credentials")]
    NoConfigDir,
}

/// The persisted token pair, serialized under fixed keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Durable home of the access/refresh token pair.
///
/// Shared by the HTTP client (reads on every dispatch, writes on refresh) and
/// the session context (writes on login and logout).
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<StoredTokens, StoreError>;
    fn save(&self, tokens: &StoredTokens) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError> {
        self.save(&StoredTokens::default())
    }

    fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.access_token)
    }

    fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.refresh_token)
    }

    /// Read-modify-write of the stored pair. Stores with their own lock
    /// override this so the whole update happens under it.
    fn update(&self, apply: &mut dyn FnMut(&mut StoredTokens)) -> Result<(), StoreError> {
        let mut tokens = self.load()?;
        apply(&mut tokens);
        self.save(&tokens)
    }

    fn set_access_token(&self, token: &str) -> Result<(), StoreError> {
        self.update(&mut |tokens| tokens.access_token = Some(token.to_string()))
    }

    fn set_pair(&self, access: &str, refresh: &str) -> Result<(), StoreError> {
        self.save(&StoredTokens {
            access_token: Some(access.to_string()),
            refresh_token: Some(refresh.to_string()),
        })
    }
}

/// Process-local store that forgets everything when dropped
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        Self {
            tokens: Mutex::new(StoredTokens {
                access_token: access.map(str::to_string),
                refresh_token: refresh.map(str::to_string),
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<StoredTokens, StoreError> {
        let guard = self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), StoreError> {
        let mut guard = self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = tokens.clone();
        Ok(())
    }

    fn update(&self, apply: &mut dyn FnMut(&mut StoredTokens)) -> Result<(), StoreError> {
        let mut guard = self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        apply(&mut *guard);
        Ok(())
    }
}

/// JSON file store; the file is removed entirely when both tokens are cleared
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<config dir>/estate-market/tokens.json`
    pub fn default_path() -> Result<PathBuf, StoreError> {
        dirs::config_dir()
            .map(|dir| dir.join("estate-market").join(TOKEN_FILE_NAME))
            .ok_or(StoreError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredTokens, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredTokens::default())
            }
            Err(e) => return Err(StoreError::Io(format!("read {}: {e}", self.path.display()))),
        };
        if raw.trim().is_empty() {
            return Ok(StoredTokens::default());
        }
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    /// Writes the pair, or removes the file when both tokens are gone
    fn persist(&self, tokens: &StoredTokens) -> Result<(), StoreError> {
        if tokens.access_token.is_none() && tokens.refresh_token.is_none() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StoreError::Io(format!("delete {}: {e}", self.path.display()))),
            };
        }
        self.write(tokens)
    }

    fn write(&self, tokens: &StoredTokens) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("mkdir {}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(tokens).map_err(|e| StoreError::Io(e.to_string()))?;
        fs::write(&self.path, json)
            .map_err(|e| StoreError::Io(format!("write {}: {e}", self.path.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|e| StoreError::Io(format!("chmod {}: {e}", self.path.display())))?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<StoredTokens, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.read()
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.persist(tokens)
    }

    fn update(&self, apply: &mut dyn FnMut(&mut StoredTokens)) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut tokens = self.read()?;
        apply(&mut tokens);
        self.persist(&tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_store_round_trip_uses_fixed_keys() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileTokenStore::new(tmp.path().join("nested").join("tokens.json"));

        store.set_pair("access-1", "refresh-1").expect("save");
        let raw = std::fs::read_to_string(store.path()).expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value[ACCESS_TOKEN_KEY], "access-1");
        assert_eq!(value[REFRESH_TOKEN_KEY], "refresh-1");

        store.set_access_token("access-2").expect("update");
        assert_eq!(store.access_token().expect("load"), Some("access-2".to_string()));
        assert_eq!(store.refresh_token().expect("load"), Some("refresh-1".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileTokenStore::new(tmp.path().join("tokens.json"));
        store.set_pair("a", "r").expect("save");

        let mode = std::fs::metadata(store.path()).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn clear_removes_the_file_and_missing_file_loads_empty() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileTokenStore::new(tmp.path().join("tokens.json"));
        store.set_pair("a", "r").expect("save");

        store.clear().expect("clear");
        assert!(!store.path().exists());
        assert_eq!(store.load().expect("load"), StoredTokens::default());
        store.clear().expect("clearing twice is fine");
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = std::sync::Arc::new(FileTokenStore::new(tmp.path().join("tokens.json")));
        store.set_pair("0", "R1").expect("seed");

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store
                            .update(&mut |tokens| {
                                let n: u32 = tokens
                                    .access_token
                                    .as_deref()
                                    .unwrap_or("0")
                                    .parse()
                                    .unwrap_or(0);
                                tokens.access_token = Some((n + 1).to_string());
                            })
                            .expect("update");
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker");
        }

        assert_eq!(
            store.load().expect("load"),
            StoredTokens {
                access_token: Some("100".into()),
                refresh_token: Some("R1".into()),
            }
        );
    }

    #[test]
    fn corrupt_file_is_reported() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("tokens.json");
        std::fs::write(&path, "{not json").expect("write");

        let store = FileTokenStore::new(path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn memory_store_keeps_refresh_token_when_access_rotates() {
        let store = MemoryTokenStore::with_tokens(Some("T1"), Some("R1"));
        store.set_access_token("T2").expect("rotate");
        assert_eq!(
            store.load().expect("load"),
            StoredTokens {
                access_token: Some("T2".into()),
                refresh_token: Some("R1".into()),
            }
        );
    }
}

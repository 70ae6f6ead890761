//! Authentication session persisted through a key-value store.
//!
//! A session is issued after a successful login and invalidated on logout or when the
//! backend answers `401`. The token and the signed-in user are written through a
//! [`KeyValueStore`] so they survive restarts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use agenda_engine::account::User;
use tracing::warn;

use crate::error::{ClientError, Result};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object in a file, rewritten on every change.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| ClientError::Store(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(ClientError::Store(format!("{}: {}", path.display(), e))),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let store_err = |e: std::io::Error| ClientError::Store(format!("{}: {}", self.path.display(), e));
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(store_err)?;
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, content).map_err(store_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct SessionManager<S> {
    store: S,
    token: Option<String>,
    user: Option<User>,
}

impl<S: KeyValueStore> SessionManager<S> {
    /// Restore any session previously written to `store`.
    ///
    /// A stored user that no longer decodes is discarded along with its token.
    pub fn new(store: S) -> Self {
        let token = store.get(TOKEN_KEY);
        let user = store.get(USER_KEY).and_then(|raw| match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "discarding unreadable stored user");
                None
            }
        });
        let mut session = Self { store, token, user };
        if session.token.is_some() != session.user.is_some() {
            session.invalidate();
        }
        session
    }

    pub fn issue(&mut self, token: String, user: User) -> Result<()> {
        let user_json = serde_json::to_string(&user)?;
        self.store.set(TOKEN_KEY, &token)?;
        self.store.set(USER_KEY, &user_json)?;
        self.token = Some(token);
        self.user = Some(user);
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    /// Drop the session in memory and in the store. Store failures are logged, not returned.
    pub fn invalidate(&mut self) {
        self.token = None;
        self.user = None;
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(error = %e, key, "failed to clear session key");
            }
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::client::ClientError;
use crate::db::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
}

/// JSON file that keeps the session across restarts.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file is an empty session.
    pub fn load(&self) -> Option<StoredSession> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "cannot read session file: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "discarding corrupt session file: {}", e);
                None
            }
        }
    }

    pub fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Current token and user, persisted through a [`SessionStore`] and
/// broadcast to subscribers whenever it changes.
#[derive(Debug)]
pub struct Session {
    store: SessionStore,
    current: watch::Sender<Option<StoredSession>>,
}

impl Session {
    /// Restores whatever the store holds.
    pub fn open(store: SessionStore) -> Self {
        let (current, _) = watch::channel(store.load());
        Self { store, current }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<StoredSession>> {
        self.current.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.current.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current
            .borrow()
            .as_ref()
            .is_some_and(|s| s.user.role == Role::Admin)
    }

    pub fn establish(&self, token: String, user: User) -> Result<(), ClientError> {
        let session = StoredSession { token, user };
        self.store.save(&session)?;
        self.current.send_replace(Some(session));
        Ok(())
    }

    /// Drops the in-memory session first so observers are notified even if
    /// removing the file fails.
    pub fn clear(&self) -> Result<(), ClientError> {
        self.current.send_replace(None);
        self.store.clear()
    }
}

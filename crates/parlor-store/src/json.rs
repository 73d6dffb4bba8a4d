//! JSON-file user store: the production implementation.
//!
//! Accounts live in memory as a `Vec<User>` and on disk as a
//! pretty-printed JSON array (the same layout a `users.json` produced by
//! the original service has). Every successful mutation is persisted
//! before it is acknowledged: the write happens under the same lock as
//! the in-memory change, and if the file write fails the in-memory change
//! is rolled back and the caller gets an error. A crash can lose an
//! unacknowledged write; it can never lose an acknowledged one.
//!
//! The file is replaced via write-to-temp-then-rename so a crash mid-write
//! leaves the previous file intact rather than a truncated one.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::{StoreError, User, UserPatch, UserStore};

/// A [`UserStore`] backed by a JSON file.
pub struct JsonStore {
    path: PathBuf,
    users: RwLock<Vec<User>>,
}

impl JsonStore {
    /// Opens the store at `path`, loading existing accounts if the file
    /// is present and starting empty if it is not.
    ///
    /// # Errors
    /// A file that exists but cannot be read or parsed is an error, not
    /// an empty store: silently discarding a full user database on a
    /// parse error would be worse than refusing to start.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let users = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            let users: Vec<User> = serde_json::from_str(&data)?;
            tracing::info!(
                path = %path.display(),
                count = users.len(),
                "loaded user store"
            );
            users
        } else {
            tracing::info!(
                path = %path.display(),
                "no users file found, starting empty"
            );
            Vec::new()
        };

        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    /// Writes the given snapshot to disk. Called with the write lock
    /// held, so persisted bytes always match the in-memory state the
    /// caller is about to commit.
    fn persist(&self, users: &[User]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(users)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl UserStore for JsonStore {
    fn get(&self, name: &str) -> Option<User> {
        self.users
            .read()
            .expect("user store lock poisoned")
            .iter()
            .find(|u| u.name == name)
            .cloned()
    }

    fn create(&self, user: User) -> Result<(), StoreError> {
        let mut users =
            self.users.write().expect("user store lock poisoned");
        if users.iter().any(|u| u.name == user.name) {
            return Err(StoreError::AlreadyExists(user.name));
        }

        users.push(user);
        if let Err(e) = self.persist(&users) {
            // Roll back: the account was never durable, so the caller
            // must not see it as created.
            let user = users.pop().expect("just pushed");
            tracing::error!(
                name = %user.name,
                error = %e,
                "persist failed, registration rolled back"
            );
            return Err(e);
        }
        Ok(())
    }

    fn update(
        &self,
        name: &str,
        patch: UserPatch,
    ) -> Result<User, StoreError> {
        let mut users =
            self.users.write().expect("user store lock poisoned");
        let idx = users
            .iter()
            .position(|u| u.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let prev = users[idx].clone();
        patch.apply(&mut users[idx]);

        if let Err(e) = self.persist(&users) {
            users[idx] = prev;
            tracing::error!(
                name,
                error = %e,
                "persist failed, update rolled back"
            );
            return Err(e);
        }
        Ok(users[idx].clone())
    }

    fn list(&self) -> Vec<User> {
        self.users
            .read()
            .expect("user store lock poisoned")
            .clone()
    }
}

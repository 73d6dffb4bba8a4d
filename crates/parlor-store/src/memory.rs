//! In-memory user store for tests and development.

use std::sync::RwLock;

use crate::{StoreError, User, UserPatch, UserStore};

/// A [`UserStore`] that keeps accounts only in memory.
///
/// No durability at all: everything is gone when the process exits. Use
/// it in tests and local development; production uses
/// [`JsonStore`](crate::JsonStore).
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryStore {
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
        // Uniqueness check and insert under one write guard: concurrent
        // registrations of the same name cannot both pass the check.
        if users.iter().any(|u| u.name == user.name) {
            return Err(StoreError::AlreadyExists(user.name));
        }
        users.push(user);
        Ok(())
    }

    fn update(
        &self,
        name: &str,
        patch: UserPatch,
    ) -> Result<User, StoreError> {
        let mut users =
            self.users.write().expect("user store lock poisoned");
        let user = users
            .iter_mut()
            .find(|u| u.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        patch.apply(user);
        Ok(user.clone())
    }

    fn list(&self) -> Vec<User> {
        self.users
            .read()
            .expect("user store lock poisoned")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_create_then_get_returns_account() {
        let store = MemoryStore::new();
        store.create(User::new("alice", "secret1")).unwrap();

        let user = store.get("alice").expect("should exist");
        assert_eq!(user.name, "alice");
        assert_eq!(user.pass, "secret1");
    }

    #[test]
    fn test_create_duplicate_returns_already_exists() {
        let store = MemoryStore::new();
        store.create(User::new("alice", "secret1")).unwrap();

        let result = store.create(User::new("alice", "anything"));
        assert!(
            matches!(result, Err(StoreError::AlreadyExists(n)) if n == "alice")
        );
        // The original record is untouched.
        assert_eq!(store.get("alice").unwrap().pass, "secret1");
    }

    #[test]
    fn test_get_unknown_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get("nobody").is_none());
    }

    #[test]
    fn test_update_unknown_returns_not_found() {
        let store = MemoryStore::new();
        let result = store.update("nobody", UserPatch::default());
        assert!(
            matches!(result, Err(StoreError::NotFound(n)) if n == "nobody")
        );
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let store = MemoryStore::new();
        store.create(User::new("alice", "secret1")).unwrap();

        let updated = store
            .update(
                "alice",
                UserPatch {
                    balance: Some(5.0),
                    ..UserPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.balance, 5.0);
        assert_eq!(updated.nick, "alice");
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let store = MemoryStore::new();
        store.create(User::new("alice", "a")).unwrap();
        store.create(User::new("bob", "b")).unwrap();
        store.create(User::new("carol", "c")).unwrap();

        let names: Vec<_> =
            store.list().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_list_snapshot_is_isolated_from_later_writes() {
        let store = MemoryStore::new();
        store.create(User::new("alice", "a")).unwrap();

        let snapshot = store.list();
        store
            .update(
                "alice",
                UserPatch {
                    balance: Some(99.0),
                    ..UserPatch::default()
                },
            )
            .unwrap();

        // The earlier snapshot still shows the old balance.
        assert_eq!(snapshot[0].balance, 0.0);
        assert_eq!(store.get("alice").unwrap().balance, 99.0);
    }

    #[test]
    fn test_concurrent_disjoint_patches_both_land() {
        // A balance update racing an avatar-path write for the same user
        // must end with both fields applied: the write lock serializes
        // the patches and each touches only its own field.
        let store = Arc::new(MemoryStore::new());
        store.create(User::new("alice", "secret1")).unwrap();

        let balance_store = Arc::clone(&store);
        let balance_thread = std::thread::spawn(move || {
            balance_store
                .update(
                    "alice",
                    UserPatch {
                        balance: Some(5.0),
                        ..UserPatch::default()
                    },
                )
                .unwrap();
        });

        let avatar_store = Arc::clone(&store);
        let avatar_thread = std::thread::spawn(move || {
            avatar_store
                .update(
                    "alice",
                    UserPatch {
                        avatar: Some("/avatars/alice.png".into()),
                        ..UserPatch::default()
                    },
                )
                .unwrap();
        });

        balance_thread.join().unwrap();
        avatar_thread.join().unwrap();

        let user = store.get("alice").unwrap();
        assert_eq!(user.balance, 5.0);
        assert_eq!(user.avatar, "/avatars/alice.png");
    }

    #[test]
    fn test_concurrent_creates_of_same_name_one_wins() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.create(User::new("alice", format!("pass{i}")))
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();

        assert_eq!(successes, 1, "exactly one registration may win");
        assert_eq!(store.list().len(), 1);
    }
}

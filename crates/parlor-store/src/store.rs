//! The `UserStore` trait — the seam between the server and its storage.
//!
//! The server never talks to a concrete store type; it talks to this
//! contract. Production wires in [`JsonStore`](crate::JsonStore), tests
//! wire in [`MemoryStore`](crate::MemoryStore), and either can be swapped
//! for a database-backed store without touching the handler.

use crate::{StoreError, User, UserPatch};

/// Durable mapping from username to account record.
///
/// Implementations synchronize internally: every method takes `&self` and
/// is safe to call from any connection task. Operations complete without
/// suspension, which is why this is a sync trait in an async server; the
/// only blocking a store may do is local file I/O on its own writes.
///
/// # Contract
///
/// - `create` is atomic with respect to concurrent creates of the same
///   name: exactly one wins, the rest get `AlreadyExists`.
/// - Writes touching the same user are serialized; a partial update never
///   loses another update's disjoint fields.
/// - A successful `create`/`update` implies the mutation is durable (for
///   stores that persist at all): persist-then-acknowledge, never the
///   reverse.
/// - Snapshots returned by `get`/`list` are isolated copies; later writes
///   do not mutate them.
pub trait UserStore: Send + Sync + 'static {
    /// Looks up one account by username.
    fn get(&self, name: &str) -> Option<User>;

    /// Inserts a new account.
    ///
    /// # Errors
    /// - [`StoreError::AlreadyExists`] if the username is taken.
    /// - A persistence error if the store could not be made durable; the
    ///   account is NOT created in that case.
    fn create(&self, user: User) -> Result<(), StoreError>;

    /// Applies a partial update and returns the updated record.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if no such user exists.
    /// - A persistence error if the store could not be made durable; the
    ///   in-memory record is rolled back in that case.
    fn update(&self, name: &str, patch: UserPatch)
        -> Result<User, StoreError>;

    /// Returns a snapshot of all accounts in registration order.
    fn list(&self) -> Vec<User>;
}

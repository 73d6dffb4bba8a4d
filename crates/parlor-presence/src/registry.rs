//! The session registry: every live connection and who it is.
//!
//! A connection appears here from the moment the transport accepts it
//! (`attach`) until it closes (`detach`), whether or not it ever logs in.
//! Authentication adds a *binding*: connection ↔ username, at most one
//! each way. The bindings answer "who is online"; the full connection
//! table answers "who receives broadcasts" (everyone, including clients
//! that haven't logged in yet — they still see chat and roster updates).
//!
//! # Concurrency note
//!
//! `SessionRegistry` is NOT thread-safe by itself — plain `HashMap`s, no
//! interior locking. The server owns the one instance behind a single
//! `tokio::sync::Mutex`, so every mutation and every snapshot is taken
//! under that lock. Keeping the registry itself lock-free avoids hidden
//! double-locking and keeps the critical sections visible at the call
//! sites.

use std::collections::HashMap;

use parlor_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::PresenceError;

/// Sending half of a connection's outbound event channel.
///
/// The payload is an already-encoded frame: the broadcaster serializes
/// once, then every connection gets its own copy of the bytes. The
/// connection's writer task drains the receiving half onto the socket,
/// which is what gives each connection FIFO delivery.
pub type EventSender = mpsc::UnboundedSender<Vec<u8>>;

/// Receiving half, owned by the connection's writer task.
pub type EventReceiver = mpsc::UnboundedReceiver<Vec<u8>>;

/// Tracks all live connections and their authenticated identities.
///
/// ## Lifecycle
///
/// ```text
/// attach() ──→ [attached, anonymous] ──bind()──→ [attached, online]
///     │                │                               │
///     │             detach()                        unbind()
///     │                │                               │
///     └────────────────┴──→ [gone]                [attached, anonymous]
/// ```
#[derive(Default)]
pub struct SessionRegistry {
    /// Every attached connection's outbound channel, authenticated or not.
    connections: HashMap<ConnectionId, EventSender>,

    /// Authenticated bindings, one per direction. Kept in sync with each
    /// other: every entry in one has its mirror in the other.
    name_by_conn: HashMap<ConnectionId, String>,
    conn_by_name: HashMap<String, ConnectionId>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a live connection and its outbound channel. Called by
    /// the server the moment the transport accepts, before any message
    /// is read.
    pub fn attach(&mut self, id: ConnectionId, sender: EventSender) {
        self.connections.insert(id, sender);
        tracing::debug!(%id, total = self.connections.len(), "connection attached");
    }

    /// Removes a connection and any binding it had. Idempotent: a second
    /// detach of the same id is a no-op.
    ///
    /// Returns the username that was bound, if any, so the caller can
    /// broadcast the presence change.
    pub fn detach(&mut self, id: ConnectionId) -> Option<String> {
        self.connections.remove(&id);
        self.unbind(id)
    }

    /// Binds a connection to a username after a successful login.
    ///
    /// # Errors
    /// - [`PresenceError::UnknownConnection`] if the connection isn't
    ///   attached.
    /// - [`PresenceError::AlreadyBound`] if the username is bound to a
    ///   *different* live connection. Re-binding the same connection to
    ///   the same name is an idempotent success.
    pub fn bind(
        &mut self,
        id: ConnectionId,
        name: &str,
    ) -> Result<(), PresenceError> {
        if !self.connections.contains_key(&id) {
            return Err(PresenceError::UnknownConnection(id));
        }
        if let Some(existing) = self.conn_by_name.get(name) {
            if *existing != id {
                return Err(PresenceError::AlreadyBound(name.to_string()));
            }
            return Ok(());
        }

        // A connection switching identities releases its old name first,
        // keeping the two maps mirrored.
        if let Some(old) = self.name_by_conn.insert(id, name.to_string()) {
            self.conn_by_name.remove(&old);
        }
        self.conn_by_name.insert(name.to_string(), id);
        tracing::info!(%id, name, "user online");
        Ok(())
    }

    /// Removes a connection's binding without detaching it. Idempotent.
    /// Returns the username that was bound, if any.
    pub fn unbind(&mut self, id: ConnectionId) -> Option<String> {
        let name = self.name_by_conn.remove(&id)?;
        self.conn_by_name.remove(&name);
        tracing::info!(%id, name = %name, "user offline");
        Some(name)
    }

    /// The username this connection authenticated as, if any.
    pub fn name_of(&self, id: ConnectionId) -> Option<&str> {
        self.name_by_conn.get(&id).map(String::as_str)
    }

    /// Returns `true` if the username is bound to a live connection.
    pub fn is_online(&self, name: &str) -> bool {
        self.conn_by_name.contains_key(name)
    }

    /// Snapshot of all online usernames, sorted for stable output.
    pub fn online(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.conn_by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of every attached connection's outbound channel, for
    /// fan-out. Cloning an `UnboundedSender` is cheap; the caller sends
    /// without holding the registry lock.
    pub fn subscribers(&self) -> Vec<(ConnectionId, EventSender)> {
        self.connections
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect()
    }

    /// Number of attached connections (any state).
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    /// Attaches a connection and returns the receiver end so the test
    /// can observe deliveries (or drop it to simulate a dead channel).
    fn attach(reg: &mut SessionRegistry, id: u64) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        reg.attach(cid(id), tx);
        rx
    }

    // =====================================================================
    // attach() / detach()
    // =====================================================================

    #[test]
    fn test_attach_makes_connection_a_subscriber() {
        let mut reg = SessionRegistry::new();
        let _rx = attach(&mut reg, 1);

        assert_eq!(reg.connection_count(), 1);
        assert_eq!(reg.subscribers().len(), 1);
        // Anonymous connections receive broadcasts but are not online.
        assert!(reg.online().is_empty());
    }

    #[test]
    fn test_detach_removes_connection_and_binding() {
        let mut reg = SessionRegistry::new();
        let _rx = attach(&mut reg, 1);
        reg.bind(cid(1), "alice").unwrap();

        let unbound = reg.detach(cid(1));

        assert_eq!(unbound.as_deref(), Some("alice"));
        assert_eq!(reg.connection_count(), 0);
        assert!(reg.online().is_empty());
    }

    #[test]
    fn test_detach_is_idempotent() {
        let mut reg = SessionRegistry::new();
        let _rx = attach(&mut reg, 1);

        assert!(reg.detach(cid(1)).is_none()); // was never bound
        assert!(reg.detach(cid(1)).is_none()); // already gone
        assert_eq!(reg.connection_count(), 0);
    }

    // =====================================================================
    // bind() / unbind()
    // =====================================================================

    #[test]
    fn test_bind_puts_user_online() {
        let mut reg = SessionRegistry::new();
        let _rx = attach(&mut reg, 1);

        reg.bind(cid(1), "alice").unwrap();

        assert!(reg.is_online("alice"));
        assert_eq!(reg.name_of(cid(1)), Some("alice"));
        assert_eq!(reg.online(), vec!["alice".to_string()]);
    }

    #[test]
    fn test_bind_unattached_connection_returns_unknown() {
        let mut reg = SessionRegistry::new();

        let result = reg.bind(cid(99), "alice");

        assert!(matches!(
            result,
            Err(PresenceError::UnknownConnection(id)) if id == cid(99)
        ));
    }

    #[test]
    fn test_bind_name_held_by_other_connection_returns_already_bound() {
        let mut reg = SessionRegistry::new();
        let _rx1 = attach(&mut reg, 1);
        let _rx2 = attach(&mut reg, 2);
        reg.bind(cid(1), "alice").unwrap();

        let result = reg.bind(cid(2), "alice");

        assert!(matches!(
            result,
            Err(PresenceError::AlreadyBound(n)) if n == "alice"
        ));
        // The original binding survives.
        assert_eq!(reg.name_of(cid(1)), Some("alice"));
        assert_eq!(reg.name_of(cid(2)), None);
    }

    #[test]
    fn test_bind_same_connection_same_name_is_idempotent() {
        let mut reg = SessionRegistry::new();
        let _rx = attach(&mut reg, 1);
        reg.bind(cid(1), "alice").unwrap();

        reg.bind(cid(1), "alice").expect("re-bind should be a no-op");

        assert_eq!(reg.online(), vec!["alice".to_string()]);
    }

    #[test]
    fn test_bind_new_name_releases_old_one() {
        let mut reg = SessionRegistry::new();
        let _rx = attach(&mut reg, 1);
        reg.bind(cid(1), "alice").unwrap();

        reg.bind(cid(1), "bob").unwrap();

        assert!(!reg.is_online("alice"), "old name must be released");
        assert!(reg.is_online("bob"));
        assert_eq!(reg.online(), vec!["bob".to_string()]);
    }

    #[test]
    fn test_unbind_keeps_connection_attached() {
        let mut reg = SessionRegistry::new();
        let _rx = attach(&mut reg, 1);
        reg.bind(cid(1), "alice").unwrap();

        let name = reg.unbind(cid(1));

        assert_eq!(name.as_deref(), Some("alice"));
        assert!(!reg.is_online("alice"));
        // Still a subscriber: it just isn't authenticated any more.
        assert_eq!(reg.connection_count(), 1);
    }

    #[test]
    fn test_unbind_without_binding_is_none() {
        let mut reg = SessionRegistry::new();
        let _rx = attach(&mut reg, 1);
        assert!(reg.unbind(cid(1)).is_none());
    }

    #[test]
    fn test_name_freed_after_detach_can_be_rebound() {
        // Reconnect scenario: alice's connection drops, she connects
        // again and logs in from the new connection.
        let mut reg = SessionRegistry::new();
        let _rx1 = attach(&mut reg, 1);
        reg.bind(cid(1), "alice").unwrap();
        reg.detach(cid(1));

        let _rx2 = attach(&mut reg, 2);
        reg.bind(cid(2), "alice").expect("name should be free again");

        assert_eq!(reg.name_of(cid(2)), Some("alice"));
    }

    // =====================================================================
    // online() — presence consistency
    // =====================================================================

    #[test]
    fn test_online_is_sorted_and_complete() {
        let mut reg = SessionRegistry::new();
        let _rx1 = attach(&mut reg, 1);
        let _rx2 = attach(&mut reg, 2);
        let _rx3 = attach(&mut reg, 3);
        reg.bind(cid(1), "carol").unwrap();
        reg.bind(cid(2), "alice").unwrap();
        reg.bind(cid(3), "bob").unwrap();

        assert_eq!(
            reg.online(),
            vec!["alice".to_string(), "bob".into(), "carol".into()]
        );
    }

    #[test]
    fn test_online_tracks_arbitrary_bind_unbind_sequence() {
        // Presence consistency: after any sequence of operations the
        // online list equals exactly the names bound to still-attached
        // connections.
        let mut reg = SessionRegistry::new();
        let _rx1 = attach(&mut reg, 1);
        let _rx2 = attach(&mut reg, 2);
        let _rx3 = attach(&mut reg, 3);

        reg.bind(cid(1), "alice").unwrap();
        reg.bind(cid(2), "bob").unwrap();
        reg.unbind(cid(1));
        reg.bind(cid(3), "alice").unwrap();
        reg.detach(cid(2));
        reg.bind(cid(1), "dave").unwrap();

        assert_eq!(
            reg.online(),
            vec!["alice".to_string(), "dave".into()]
        );
        assert_eq!(reg.connection_count(), 2);
    }
}

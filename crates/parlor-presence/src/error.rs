//! Error types for the presence layer.

use parlor_transport::ConnectionId;

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    /// The username is already bound to a different live connection.
    /// Surfaced to the client as "already logged in": one session per
    /// username, the existing session is never silently hijacked.
    #[error("user {0} is already logged in")]
    AlreadyBound(String),

    /// The connection was never attached (or has already been detached),
    /// so it cannot be bound to a username.
    #[error("connection {0} is not attached")]
    UnknownConnection(ConnectionId),
}

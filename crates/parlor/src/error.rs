//! Unified error type for the Parlor server.

use parlor_presence::PresenceError;
use parlor_protocol::ProtocolError;
use parlor_store::StoreError;
use parlor_transport::TransportError;

use crate::AvatarError;

/// Top-level error that wraps all crate-specific errors.
///
/// Code using the `parlor` crate deals with this single type instead of
/// importing errors from each sub-crate. The `#[from]` attributes let
/// the `?` operator convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A presence-level error (binding conflicts).
    #[error(transparent)]
    Presence(#[from] PresenceError),

    /// A store-level error (uniqueness, persistence).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An avatar ingest error.
    #[error(transparent)]
    Avatar(#[from] AvatarError),

    /// An I/O error outside any sub-crate (e.g. the HTTP listener).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

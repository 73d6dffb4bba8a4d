//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding frames.
///
/// A `Decode` on an inbound frame means the client sent a malformed
/// envelope (bad JSON or an unknown `type` tag); the handler answers it
/// with an `error` event and keeps the connection open.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a protocol type into a frame).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, or an
    /// unrecognized message type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}

//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A codec converts between protocol types and raw frames. The handler and
//! broadcaster don't care HOW messages are serialized; they only need
//! something that implements the [`Codec`] trait. [`JsonCodec`] is the wire
//! format the original clients speak; a binary codec could be swapped in
//! without touching the rest of the stack.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode protocol types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec is shared by every connection
/// task for the lifetime of the server. `decode` requires
/// `DeserializeOwned` so the result doesn't borrow from the inbound frame
/// buffer, which is dropped as soon as dispatch begins.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes one frame back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is the production wire format: one JSON object per WebSocket
/// frame, readable in browser DevTools. Behind the `json` feature flag
/// (enabled by default).
///
/// ## Example
///
/// ```rust
/// use parlor_protocol::{Codec, JsonCodec, ServerEvent};
///
/// let codec = JsonCodec;
///
/// let event = ServerEvent::Msg {
///     from: "alice".into(),
///     text: "hi".into(),
/// };
///
/// let bytes = codec.encode(&event).unwrap();
/// let decoded: ServerEvent = codec.decode(&bytes).unwrap();
/// assert_eq!(event, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

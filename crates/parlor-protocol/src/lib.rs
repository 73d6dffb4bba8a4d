//! Wire protocol for Parlor.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerEvent`], [`Profile`]) —
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the server's
//! per-connection handler. It doesn't know about connections, the user
//! store, or who is online; it only knows how to name and serialize
//! messages.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage / ServerEvent) → Handler
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    valid_username, ClientMessage, Profile, ServerEvent, NICK_MAX_LEN,
    USERNAME_MAX_LEN,
};

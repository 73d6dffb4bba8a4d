//! Presence tracking and event fan-out for Parlor.
//!
//! This crate is the server's answer to two questions:
//!
//! 1. **Who is online?** — [`SessionRegistry`] pairs live connections
//!    with authenticated usernames and is the single authoritative
//!    source of the online list.
//! 2. **How does everyone hear about it?** — [`Broadcaster`] encodes an
//!    event once and delivers it, best-effort, to every attached
//!    connection's outbound channel.
//!
//! # How it fits in the stack
//!
//! ```text
//! Handler (above)     ← binds logins, asks who is online, broadcasts
//!     ↕
//! Presence (this crate) ← registry + fan-out
//!     ↕
//! Transport (below)    ← provides ConnectionId; owns the sockets
//! ```

mod broadcast;
mod error;
mod registry;

pub use broadcast::Broadcaster;
pub use error::PresenceError;
pub use registry::{EventReceiver, EventSender, SessionRegistry};

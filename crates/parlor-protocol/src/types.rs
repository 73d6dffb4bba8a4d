//! Core protocol types for Parlor's wire format.
//!
//! Every frame on the wire is one JSON object with a `type` discriminator.
//! Inbound frames decode to [`ClientMessage`]; outbound frames encode from
//! [`ServerEvent`]. The discriminator values and field names are the wire
//! contract the client SDK is written against, so they are pinned with
//! serde attributes rather than left to Rust naming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Username rules
// ---------------------------------------------------------------------------

/// Maximum username length in characters.
pub const USERNAME_MAX_LEN: usize = 20;

/// Maximum nickname length in characters. Longer nicknames are truncated
/// on write, not rejected.
pub const NICK_MAX_LEN: usize = 50;

/// Returns `true` if `name` is a valid username: 1–20 characters from
/// `[A-Za-z0-9_]`.
///
/// This is checked before any operation that names a user (`register`,
/// `updateUser`, avatar upload), both to keep the store clean and because
/// usernames become filenames in the avatar directory.
pub fn valid_username(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= USERNAME_MAX_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// Profile — the public view of a user
// ---------------------------------------------------------------------------

/// The wire view of a user: everything except the credential.
///
/// Outbound events carry profiles, never full user records. Keeping the
/// secret out of this type (rather than skipping a field at serialization
/// time) means no event can leak a password by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique username, immutable once registered.
    pub name: String,

    /// Display nickname. Defaults to the username at registration.
    pub nick: String,

    /// Avatar resource path, e.g. `/avatars/alice.png`. Empty until an
    /// avatar has been ingested.
    pub avatar: String,

    /// Account balance. Any finite number, accepted verbatim.
    pub balance: f64,

    /// When the account was registered (RFC 3339 on the wire).
    pub registered: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ClientMessage — inbound envelopes
// ---------------------------------------------------------------------------

/// A message from a client.
///
/// `#[serde(tag = "type")]` gives the internally tagged JSON the clients
/// send, e.g.:
///
/// ```json
/// { "type": "login", "name": "alice", "pass": "secret1" }
/// ```
///
/// Decoding is exhaustive: a frame whose `type` is not one of these four
/// fails to parse, and the handler answers it with an `error` event. There
/// is no silently ignored message kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Create a new account. Does not log the connection in.
    Register { name: String, pass: String },

    /// Authenticate this connection as `name`.
    Login { name: String, pass: String },

    /// Patch a user's mutable fields. Absent fields are left untouched.
    UpdateUser {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        balance: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nick: Option<String>,
    },

    /// Send a chat line to everyone. Requires an authenticated session.
    Message { text: String },
}

// ---------------------------------------------------------------------------
// ServerEvent — outbound events
// ---------------------------------------------------------------------------

/// An event from the server.
///
/// The `type` values are part of the wire contract and deliberately uneven
/// (`register_ok` but `userRegistered`): they match what the client SDK
/// already parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Full user snapshot, sent once to each new connection before
    /// authentication.
    #[serde(rename = "init")]
    Init { users: Vec<Profile> },

    /// Registration succeeded. Sent to the registering connection only.
    #[serde(rename = "register_ok")]
    RegisterOk,

    /// Login succeeded: the caller's profile and the current online list.
    #[serde(rename = "login_ok")]
    LoginOk {
        user: Profile,
        online: Vec<String>,
    },

    /// Presence update: the complete list of online usernames. Broadcast
    /// whenever someone logs in or disconnects.
    #[serde(rename = "online")]
    Online { online: Vec<String> },

    /// A new account was created. Broadcast to all connections.
    #[serde(rename = "userRegistered")]
    UserRegistered { user: Profile },

    /// A user's profile changed: the full snapshot plus who changed it.
    #[serde(rename = "updateUsers")]
    UpdateUsers {
        users: Vec<Profile>,
        #[serde(rename = "updatedBy")]
        updated_by: String,
    },

    /// A chat line from an authenticated user. Broadcast to all
    /// connections, including the sender's.
    #[serde(rename = "msg")]
    Msg { from: String, text: String },

    /// Something went wrong with the sender's last message. Sent to the
    /// originating connection only, never broadcast.
    #[serde(rename = "error")]
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================

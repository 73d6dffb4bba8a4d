//! The user record and partial updates to it.

use chrono::{DateTime, Utc};
use parlor_protocol::{Profile, NICK_MAX_LEN};
use serde::{Deserialize, Serialize};

/// A stored user account.
///
/// This is the full record, credential included. It never crosses the
/// wire: every outbound event carries a [`Profile`] instead, obtained via
/// [`User::profile`]. The field names double as the on-disk JSON keys in
/// the users file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique username, immutable once created.
    pub name: String,

    /// Login secret, compared for equality. Stored as given; hashing is
    /// an explicit non-goal of this service.
    pub pass: String,

    /// Display nickname, truncated to [`NICK_MAX_LEN`] characters on
    /// write.
    pub nick: String,

    /// Avatar resource path; empty until an avatar is ingested.
    pub avatar: String,

    /// Account balance. Any finite number, no bounds enforced.
    pub balance: f64,

    /// Registration timestamp, immutable.
    pub registered: DateTime<Utc>,
}

impl User {
    /// Creates a fresh account: nickname defaults to the username, no
    /// avatar, zero balance, registered now.
    pub fn new(name: impl Into<String>, pass: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            nick: name.clone(),
            name,
            pass: pass.into(),
            avatar: String::new(),
            balance: 0.0,
            registered: Utc::now(),
        }
    }

    /// Returns the public view of this record (everything but `pass`).
    pub fn profile(&self) -> Profile {
        Profile {
            name: self.name.clone(),
            nick: self.nick.clone(),
            avatar: self.avatar.clone(),
            balance: self.balance,
            registered: self.registered,
        }
    }
}

/// A partial update to a user's mutable fields.
///
/// Only the fields that are `Some` are applied; the rest of the record is
/// left untouched. This is what makes concurrent updates to disjoint
/// fields safe: a balance patch and an avatar patch for the same user
/// never overwrite each other's field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    /// New balance, applied verbatim.
    pub balance: Option<f64>,

    /// New nickname, truncated to [`NICK_MAX_LEN`] characters.
    pub nick: Option<String>,

    /// New avatar path. Set by the avatar collaborator, not by clients.
    pub avatar: Option<String>,
}

impl UserPatch {
    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.balance.is_none() && self.nick.is_none() && self.avatar.is_none()
    }

    /// Applies the present fields to `user` in place.
    pub fn apply(&self, user: &mut User) {
        if let Some(balance) = self.balance {
            user.balance = balance;
        }
        if let Some(nick) = &self.nick {
            user.nick = nick.chars().take(NICK_MAX_LEN).collect();
        }
        if let Some(avatar) = &self.avatar {
            user.avatar = avatar.clone();
        }
    }
}

//! User accounts for Parlor.
//!
//! This crate owns the durable side of the system:
//!
//! 1. **The record** ([`User`], [`UserPatch`]) — what an account is and
//!    how partial updates to it are expressed.
//! 2. **The contract** ([`UserStore`]) — what the server needs from any
//!    store: atomic create, partial update, isolated snapshots.
//! 3. **The implementations** — [`JsonStore`] (a JSON array on disk,
//!    persisted before a write is acknowledged) and [`MemoryStore`]
//!    (volatile, for tests and development).
//!
//! # How it fits in the stack
//!
//! ```text
//! Handler (above)   ← registers, authenticates, patches profiles
//!     ↕
//! Store (this crate) ← owns account data and its durability
//!     ↕
//! Protocol (below)   ← provides Profile, the public view of a User
//! ```

mod error;
mod json;
mod memory;
mod store;
mod user;

pub use error::StoreError;
pub use json::JsonStore;
pub use memory::MemoryStore;
pub use store::UserStore;
pub use user::{User, UserPatch};

//! # Parlor
//!
//! A small real-time presence and chat server.
//!
//! Clients connect over a WebSocket, register or log in, and the server
//! fans chat lines and roster updates out to every connected client. A
//! separate HTTP surface accepts avatar uploads and serves them back.
//!
//! This crate ties the layers together: transport → protocol →
//! store/presence → per-connection handler. The interesting pieces live
//! in the sub-crates; here is the wiring, the accept loop, and the
//! message dispatch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = JsonStore::load("users.json")?;
//!     let server = ServerBuilder::new()
//!         .bind("0.0.0.0:3001")
//!         .http_bind("0.0.0.0:3000")
//!         .build(store)
//!         .await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

mod avatar;
mod config;
mod error;
mod handler;
mod http;
mod server;

pub use avatar::{AvatarDir, AvatarError, AvatarIngest, MAX_AVATAR_BYTES};
pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{ParlorServer, ServerBuilder};

/// Everything a server binary or integration test usually needs.
pub mod prelude {
    pub use crate::{
        AvatarDir, AvatarIngest, ParlorServer, ServerBuilder, ServerConfig,
        ServerError,
    };
    pub use parlor_presence::{Broadcaster, SessionRegistry};
    pub use parlor_protocol::{
        valid_username, ClientMessage, Codec, JsonCodec, Profile,
        ServerEvent,
    };
    pub use parlor_store::{
        JsonStore, MemoryStore, StoreError, User, UserPatch, UserStore,
    };
    pub use parlor_transport::ConnectionId;
}

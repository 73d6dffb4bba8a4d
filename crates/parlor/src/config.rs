//! Server configuration.

use std::path::PathBuf;

/// Configuration for a Parlor server.
///
/// The builder fills this in; `parlord` additionally reads environment
/// overrides (`PORT`, `PARLOR_HTTP_PORT`, `PARLOR_USERS_FILE`,
/// `PARLOR_AVATAR_DIR`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub ws_addr: String,

    /// Address the HTTP listener (avatar upload, health) binds to.
    pub http_addr: String,

    /// Path of the JSON users file.
    pub users_file: PathBuf,

    /// Directory avatar images are written to and served from.
    pub avatars_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_addr: "127.0.0.1:3001".to_string(),
            http_addr: "127.0.0.1:3000".to_string(),
            users_file: PathBuf::from("users.json"),
            avatars_dir: PathBuf::from("avatars"),
        }
    }
}

//! `ParlorServer` builder and accept loop.
//!
//! This is the entry point for running a Parlor server. It ties together
//! all the layers: transport → protocol → store/presence → handler, and
//! runs the HTTP avatar surface alongside the WebSocket listener.

use std::path::PathBuf;
use std::sync::Arc;

use parlor_presence::{Broadcaster, SessionRegistry};
use parlor_protocol::{Codec, JsonCodec};
use parlor_store::UserStore;
use parlor_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::avatar::AvatarDir;
use crate::handler::handle_connection;
use crate::{http, ServerConfig, ServerError};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The store
/// synchronizes internally; the registry is the one piece guarded by an
/// explicit `Mutex` (the broadcaster holds a second handle to it).
pub(crate) struct ServerState<S: UserStore, C: Codec> {
    pub(crate) store: S,
    pub(crate) registry: Arc<Mutex<SessionRegistry>>,
    pub(crate) broadcaster: Broadcaster<C>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,ignore
/// let server = ServerBuilder::new()
///     .bind("0.0.0.0:3001")
///     .http_bind("0.0.0.0:3000")
///     .build(JsonStore::load("users.json")?)
///     .await?;
/// server.run().await
/// ```
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the WebSocket listen address.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.ws_addr = addr.to_string();
        self
    }

    /// Sets the HTTP listen address (avatar upload, health).
    pub fn http_bind(mut self, addr: &str) -> Self {
        self.config.http_addr = addr.to_string();
        self
    }

    /// Sets the directory avatars are written to and served from.
    pub fn avatars_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.avatars_dir = dir.into();
        self
    }

    /// Builds the server around the given user store.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`; both listeners are
    /// bound here, so a taken port fails fast instead of inside `run`.
    pub async fn build<S: UserStore>(
        self,
        store: S,
    ) -> Result<ParlorServer<S, JsonCodec>, ServerError> {
        let transport =
            WebSocketTransport::bind(&self.config.ws_addr).await?;
        let http_listener =
            tokio::net::TcpListener::bind(&self.config.http_addr).await?;
        tracing::info!(
            addr = %self.config.http_addr,
            "HTTP surface listening"
        );

        let codec = JsonCodec;
        let registry = Arc::new(Mutex::new(SessionRegistry::new()));
        let broadcaster = Broadcaster::new(Arc::clone(&registry), codec);

        let state = Arc::new(ServerState {
            store,
            registry,
            broadcaster,
            codec,
        });
        let avatars = Arc::new(AvatarDir::new(&self.config.avatars_dir));

        Ok(ParlorServer {
            transport,
            http_listener,
            state,
            avatars,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Parlor server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ParlorServer<S: UserStore, C: Codec> {
    transport: WebSocketTransport,
    http_listener: tokio::net::TcpListener,
    state: Arc<ServerState<S, C>>,
    avatars: Arc<AvatarDir>,
}

impl<S, C> ParlorServer<S, C>
where
    S: UserStore,
    C: Codec + Clone,
{
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address of the WebSocket listener.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the local address of the HTTP listener.
    pub fn http_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.http_listener.local_addr()
    }

    /// Runs the server: the HTTP surface in a background task, then the
    /// WebSocket accept loop with one handler task per connection. Runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        let app =
            http::router(Arc::clone(&self.state), Arc::clone(&self.avatars));
        let http_listener = self.http_listener;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(http_listener, app).await {
                tracing::error!(error = %e, "HTTP surface exited");
            }
        });

        tracing::info!("Parlor server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(handle_connection(conn, state));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

//! The Parlor server binary.
//!
//! Configuration comes from the environment:
//! - `PORT` — WebSocket port (default 3001)
//! - `PARLOR_HTTP_PORT` — HTTP port for avatars and health (default 3000)
//! - `PARLOR_USERS_FILE` — users database path (default `users.json`)
//! - `PARLOR_AVATAR_DIR` — avatar directory (default `avatars`)
//! - `RUST_LOG` — log filter (default `info`)

use parlor::prelude::*;
use tracing_subscriber::EnvFilter;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig {
        ws_addr: format!("0.0.0.0:{}", env_or("PORT", "3001")),
        http_addr: format!(
            "0.0.0.0:{}",
            env_or("PARLOR_HTTP_PORT", "3000")
        ),
        users_file: env_or("PARLOR_USERS_FILE", "users.json").into(),
        avatars_dir: env_or("PARLOR_AVATAR_DIR", "avatars").into(),
    };

    let store = JsonStore::load(&config.users_file)?;

    tracing::info!(
        ws = %config.ws_addr,
        http = %config.http_addr,
        "parlord starting"
    );

    let server = ServerBuilder::new().config(config).build(store).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            // Store writes are synchronous, so there is nothing left to
            // flush on the way out.
            tracing::info!("shutdown signal received, exiting");
        }
    }
    Ok(())
}

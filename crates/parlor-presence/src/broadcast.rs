//! Best-effort event fan-out to every attached connection.

use std::sync::Arc;

use parlor_protocol::{Codec, ServerEvent};
use tokio::sync::Mutex;

use crate::SessionRegistry;

/// Delivers one event to every connection the registry knows about.
///
/// The sequence is deliberate:
///
/// 1. Encode the event once.
/// 2. Take a snapshot of the subscriber channels under the registry lock.
/// 3. Release the lock, then send to each channel independently.
///
/// No lock is held while anything is delivered, and a connection that is
/// mid-close just has its send fail; that delivery is logged and skipped
/// without affecting the rest. Callers never see a delivery error:
/// fan-out is best-effort at-most-once by contract.
pub struct Broadcaster<C: Codec> {
    registry: Arc<Mutex<SessionRegistry>>,
    codec: C,
}

impl<C: Codec> Broadcaster<C> {
    /// Creates a broadcaster over the given registry.
    pub fn new(registry: Arc<Mutex<SessionRegistry>>, codec: C) -> Self {
        Self { registry, codec }
    }

    /// Fans `event` out to every connection attached at this moment.
    ///
    /// Connections attached after the snapshot is taken don't receive
    /// this event; connections that close mid-delivery are skipped.
    pub async fn broadcast(&self, event: &ServerEvent) {
        let bytes = match self.codec.encode(event) {
            Ok(bytes) => bytes,
            Err(e) => {
                // An unencodable event is a server bug; there is nothing
                // useful to deliver, so drop the broadcast.
                tracing::error!(error = %e, "failed to encode broadcast event");
                return;
            }
        };

        let targets = {
            let registry = self.registry.lock().await;
            registry.subscribers()
        };

        tracing::debug!(recipients = targets.len(), "broadcasting event");
        for (id, sender) in targets {
            if sender.send(bytes.clone()).is_err() {
                tracing::debug!(%id, "dropping event for closing connection");
            }
        }
    }
}

// Manual impl: `#[derive(Clone)]` would demand `C: Clone`, but only the
// handle needs cloning, not the codec bound.
impl<C: Codec + Clone> Clone for Broadcaster<C> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            codec: self.codec.clone(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

//! Per-connection handler: the protocol state machine.
//!
//! Each accepted connection gets its own task running this handler.
//! The flow is:
//!   1. Attach to the registry, spawn the writer task
//!   2. Send `init` (the full profile snapshot) to this connection only
//!   3. Loop: receive frames → decode → dispatch
//!   4. On close: detach; if the session was authenticated, broadcast
//!      the updated online list
//!
//! Failures stay on the connection that caused them: every rejected
//! operation becomes one `error` event to the sender, never a broadcast,
//! and never the end of the connection.

use std::sync::Arc;

use parlor_presence::{EventReceiver, EventSender};
use parlor_protocol::{
    valid_username, ClientMessage, Codec, Profile, ServerEvent,
};
use parlor_store::{StoreError, User, UserPatch, UserStore};
use parlor_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;

// Client-facing error strings. The client SDK string-matches some of
// these, so they are fixed here rather than composed ad hoc.
const ERR_INVALID_USERNAME: &str =
    "Invalid username format. Use only letters, numbers and underscore.";
const ERR_USER_EXISTS: &str = "User already exists";
const ERR_BAD_CREDENTIALS: &str = "Wrong username or password";
const ERR_ALREADY_LOGGED_IN: &str = "User already logged in";
const ERR_NOT_LOGGED_IN: &str = "Not logged in";
const ERR_MALFORMED: &str = "Invalid message format";
const ERR_INTERNAL: &str = "Internal server error";

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S, C>>,
) where
    S: UserStore,
    C: Codec,
{
    let conn_id = conn.id();
    let (tx, rx) = mpsc::unbounded_channel();

    // Attach before anything is sent: from this moment on the connection
    // receives broadcasts, and the writer task owns all socket writes.
    state.registry.lock().await.attach(conn_id, tx.clone());
    let writer = tokio::spawn(write_loop(conn.clone(), rx));

    let users: Vec<Profile> =
        state.store.list().iter().map(User::profile).collect();
    send_event(&tx, &state.codec, &ServerEvent::Init { users });

    loop {
        match conn.recv().await {
            Ok(Some(frame)) => {
                dispatch(&state, conn_id, &tx, &frame).await;
            }
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        }
    }

    // Teardown. Detach first so the departing connection is out of the
    // snapshot, then tell everyone who is left.
    let unbound = state.registry.lock().await.detach(conn_id);
    if let Some(name) = unbound {
        tracing::info!(%conn_id, name = %name, "authenticated connection closed");
        let online = state.registry.lock().await.online();
        state
            .broadcaster
            .broadcast(&ServerEvent::Online { online })
            .await;
    }

    // Dropping our sender (the registry's clone is already gone) ends
    // the writer after it drains what was queued.
    drop(tx);
    let _ = writer.await;
}

/// Drains the outbound channel onto the socket.
///
/// One writer per connection is what gives per-connection FIFO: direct
/// replies and broadcasts are enqueued in order and leave in order.
async fn write_loop(conn: WebSocketConnection, mut rx: EventReceiver) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(id = %conn.id(), error = %e, "outbound send failed");
            break;
        }
    }
    let _ = conn.close().await;
}

/// Decodes one inbound frame and routes it to the right operation.
async fn dispatch<S, C>(
    state: &Arc<ServerState<S, C>>,
    conn_id: ConnectionId,
    tx: &EventSender,
    frame: &[u8],
) where
    S: UserStore,
    C: Codec,
{
    let msg: ClientMessage = match state.codec.decode(frame) {
        Ok(msg) => msg,
        Err(e) => {
            // Malformed envelope or unknown type: tell the sender,
            // keep the connection.
            tracing::debug!(%conn_id, error = %e, "malformed envelope");
            send_error(tx, &state.codec, ERR_MALFORMED);
            return;
        }
    };

    match msg {
        ClientMessage::Register { name, pass } => {
            register(state, tx, name, pass).await;
        }
        ClientMessage::Login { name, pass } => {
            login(state, conn_id, tx, name, pass).await;
        }
        ClientMessage::UpdateUser {
            name,
            balance,
            nick,
        } => {
            update_user(state, tx, name, balance, nick).await;
        }
        ClientMessage::Message { text } => {
            chat_message(state, conn_id, tx, text).await;
        }
    }
}

/// `register`: create the account, confirm to the caller, announce the
/// new profile to everyone. Does not log the connection in.
async fn register<S, C>(
    state: &Arc<ServerState<S, C>>,
    tx: &EventSender,
    name: String,
    pass: String,
) where
    S: UserStore,
    C: Codec,
{
    if !valid_username(&name) {
        send_error(tx, &state.codec, ERR_INVALID_USERNAME);
        return;
    }

    let user = User::new(name, pass);
    let profile = user.profile();
    match state.store.create(user) {
        Ok(()) => {
            tracing::info!(name = %profile.name, "user registered");
            send_event(tx, &state.codec, &ServerEvent::RegisterOk);
            state
                .broadcaster
                .broadcast(&ServerEvent::UserRegistered { user: profile })
                .await;
        }
        Err(StoreError::AlreadyExists(_)) => {
            send_error(tx, &state.codec, ERR_USER_EXISTS);
        }
        Err(e) => {
            tracing::error!(
                name = %profile.name,
                error = %e,
                "registration failed to persist"
            );
            send_error(tx, &state.codec, ERR_INTERNAL);
        }
    }
}

/// `login`: check credentials, bind the session, reply with the profile
/// and online list, and broadcast the presence change.
async fn login<S, C>(
    state: &Arc<ServerState<S, C>>,
    conn_id: ConnectionId,
    tx: &EventSender,
    name: String,
    pass: String,
) where
    S: UserStore,
    C: Codec,
{
    // One lookup covers both unknown-user and wrong-password; the reply
    // does not reveal which one it was.
    let user = match state.store.get(&name) {
        Some(user) if user.pass == pass => user,
        _ => {
            send_error(tx, &state.codec, ERR_BAD_CREDENTIALS);
            return;
        }
    };

    let online = {
        let mut registry = state.registry.lock().await;
        // A connection is Unauthenticated or Authenticated, never
        // re-authenticated in place.
        if registry.name_of(conn_id).is_some() {
            drop(registry);
            send_error(tx, &state.codec, ERR_ALREADY_LOGGED_IN);
            return;
        }
        if let Err(e) = registry.bind(conn_id, &name) {
            tracing::debug!(%conn_id, name = %name, error = %e, "login rejected");
            drop(registry);
            send_error(tx, &state.codec, ERR_ALREADY_LOGGED_IN);
            return;
        }
        registry.online()
    };

    send_event(
        tx,
        &state.codec,
        &ServerEvent::LoginOk {
            user: user.profile(),
            online: online.clone(),
        },
    );
    state
        .broadcaster
        .broadcast(&ServerEvent::Online { online })
        .await;
}

/// `updateUser`: patch the named profile and broadcast the new snapshot.
///
/// Deliberately permissive: no authentication required, and an unknown
/// username is a quiet no-op rather than an error.
async fn update_user<S, C>(
    state: &Arc<ServerState<S, C>>,
    tx: &EventSender,
    name: String,
    balance: Option<f64>,
    nick: Option<String>,
) where
    S: UserStore,
    C: Codec,
{
    if !valid_username(&name) {
        send_error(tx, &state.codec, ERR_INVALID_USERNAME);
        return;
    }

    let patch = UserPatch {
        balance,
        nick,
        avatar: None,
    };
    match state.store.update(&name, patch) {
        Ok(_) => {
            let users: Vec<Profile> =
                state.store.list().iter().map(User::profile).collect();
            state
                .broadcaster
                .broadcast(&ServerEvent::UpdateUsers {
                    users,
                    updated_by: name,
                })
                .await;
        }
        Err(StoreError::NotFound(_)) => {}
        Err(e) => {
            tracing::error!(
                name = %name,
                error = %e,
                "profile update failed to persist"
            );
            send_error(tx, &state.codec, ERR_INTERNAL);
        }
    }
}

/// `message`: broadcast a chat line under the sender's bound username.
async fn chat_message<S, C>(
    state: &Arc<ServerState<S, C>>,
    conn_id: ConnectionId,
    tx: &EventSender,
    text: String,
) where
    S: UserStore,
    C: Codec,
{
    let from = {
        let registry = state.registry.lock().await;
        registry.name_of(conn_id).map(str::to_owned)
    };
    let Some(from) = from else {
        send_error(tx, &state.codec, ERR_NOT_LOGGED_IN);
        return;
    };

    state
        .broadcaster
        .broadcast(&ServerEvent::Msg { from, text })
        .await;
}

/// Encodes and enqueues one event for this connection. The receiver only
/// disappears when the connection is tearing down, so a failed enqueue
/// is dropped without comment.
fn send_event<C: Codec>(
    tx: &EventSender,
    codec: &C,
    event: &ServerEvent,
) {
    match codec.encode(event) {
        Ok(bytes) => {
            let _ = tx.send(bytes);
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to encode event");
        }
    }
}

/// Shorthand for the one-per-failure `error` reply.
fn send_error<C: Codec>(tx: &EventSender, codec: &C, message: &str) {
    send_event(
        tx,
        codec,
        &ServerEvent::Error {
            message: message.to_string(),
        },
    );
}

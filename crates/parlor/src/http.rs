//! HTTP surface: avatar upload, avatar serving, health.
//!
//! This sits next to the chat core, not inside it. The upload route
//! decodes the payload, hands the bytes to the avatar collaborator, and
//! records the returned path through the same `UserStore` contract the
//! handler uses. Nothing here touches the registry or broadcasts.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use parlor_protocol::{valid_username, Codec};
use parlor_store::{StoreError, UserPatch, UserStore};
use serde::Deserialize;
use serde_json::json;

use crate::avatar::{AvatarDir, AvatarError, AvatarIngest};
use crate::server::ServerState;

/// State shared by the HTTP handlers: the server core plus the avatar
/// collaborator.
pub(crate) struct HttpState<S: UserStore, C: Codec> {
    server: Arc<ServerState<S, C>>,
    avatars: Arc<AvatarDir>,
}

// Manual impl: deriving would demand `S: Clone` and `C: Clone`, but only
// the two `Arc`s are cloned.
impl<S: UserStore, C: Codec> Clone for HttpState<S, C> {
    fn clone(&self) -> Self {
        Self {
            server: Arc::clone(&self.server),
            avatars: Arc::clone(&self.avatars),
        }
    }
}

/// Builds the HTTP router.
pub(crate) fn router<S, C>(
    server: Arc<ServerState<S, C>>,
    avatars: Arc<AvatarDir>,
) -> Router
where
    S: UserStore,
    C: Codec,
{
    Router::new()
        .route("/uploadAvatar", post(upload_avatar::<S, C>))
        .route("/avatars/:file", get(serve_avatar::<S, C>))
        .route("/health", get(health::<S, C>))
        .with_state(HttpState { server, avatars })
}

/// Upload request body. Both fields optional so a missing one produces
/// the contract's 400 message instead of a framework rejection.
#[derive(Debug, Deserialize)]
struct UploadAvatarRequest {
    username: Option<String>,
    image: Option<String>,
}

type JsonReply = (StatusCode, Json<serde_json::Value>);

fn bad_request(message: &str) -> JsonReply {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error() -> JsonReply {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
}

/// `POST /uploadAvatar` — base64 image in, resource path out.
async fn upload_avatar<S, C>(
    State(state): State<HttpState<S, C>>,
    Json(req): Json<UploadAvatarRequest>,
) -> JsonReply
where
    S: UserStore,
    C: Codec,
{
    let (Some(username), Some(image)) = (req.username, req.image) else {
        return bad_request("Username and image are required");
    };

    let bytes = match base64::engine::general_purpose::STANDARD
        .decode(image.as_bytes())
    {
        Ok(bytes) => bytes,
        Err(_) => return bad_request("Invalid image data"),
    };

    let path = match state.avatars.ingest(&username, &bytes) {
        Ok(path) => path,
        Err(AvatarError::InvalidName) => {
            return bad_request("Invalid username format");
        }
        Err(AvatarError::Empty) => return bad_request("Empty image"),
        Err(AvatarError::TooLarge { .. }) => {
            return bad_request("Image too large");
        }
        Err(AvatarError::Io(e)) => {
            tracing::error!(username = %username, error = %e, "avatar write failed");
            return internal_error();
        }
    };

    // Record the path on the profile. An unknown username is not an
    // error here: the file exists either way, and the next registration
    // under that name simply starts without it.
    let patch = UserPatch {
        avatar: Some(path.clone()),
        ..UserPatch::default()
    };
    match state.server.store.update(&username, patch) {
        Ok(_) | Err(StoreError::NotFound(_)) => {}
        Err(e) => {
            tracing::error!(
                username = %username,
                error = %e,
                "avatar path failed to persist"
            );
            return internal_error();
        }
    }

    (StatusCode::OK, Json(json!({ "ok": true, "avatar": path })))
}

/// `GET /avatars/{file}` — serves the stored PNG bytes.
async fn serve_avatar<S, C>(
    State(state): State<HttpState<S, C>>,
    Path(file): Path<String>,
) -> Response
where
    S: UserStore,
    C: Codec,
{
    // The path parameter is `<name>.png`. The charset check keeps the
    // lookup inside the avatar directory; anything else is a plain 404.
    let Some(name) = file.strip_suffix(".png") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !valid_username(name) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match tokio::fs::read(state.avatars.file_for(name)).await {
        Ok(bytes) => {
            ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `GET /health` — liveness plus a user count.
async fn health<S, C>(
    State(state): State<HttpState<S, C>>,
) -> Json<serde_json::Value>
where
    S: UserStore,
    C: Codec,
{
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "users": state.server.store.list().len(),
    }))
}

// =========================================================================
// Tests
// =========================================================================

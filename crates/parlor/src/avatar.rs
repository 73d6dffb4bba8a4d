//! The avatar ingest collaborator.
//!
//! The core never handles image bytes itself: the HTTP layer decodes the
//! upload, hands the bytes to an [`AvatarIngest`] implementation, and
//! records the returned resource path on the user's profile via
//! `UserStore::update`. That keeps image handling swappable (disk today,
//! object storage tomorrow) without touching the chat core.

use std::path::PathBuf;

use parlor_protocol::valid_username;

/// Maximum accepted avatar payload: 5 MiB of decoded image bytes.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Errors an avatar ingest can reject a payload with.
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    /// The username can't name an avatar resource. Usernames become
    /// filenames here, so the charset rule is enforced again at this
    /// boundary regardless of what the caller checked.
    #[error("invalid username for avatar")]
    InvalidName,

    /// The decoded payload was empty.
    #[error("empty image payload")]
    Empty,

    /// The decoded payload exceeds [`MAX_AVATAR_BYTES`].
    #[error("image too large: {size} bytes")]
    TooLarge { size: usize },

    /// Writing the image failed.
    #[error("avatar I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Accepts decoded image bytes for a user and returns a stable resource
/// path for them.
pub trait AvatarIngest: Send + Sync + 'static {
    /// Validates and stores `image` for `name`.
    ///
    /// # Errors
    /// Rejects invalid usernames, empty payloads, and payloads over
    /// [`MAX_AVATAR_BYTES`]; surfaces I/O failures.
    fn ingest(&self, name: &str, image: &[u8])
        -> Result<String, AvatarError>;
}

/// An [`AvatarIngest`] that writes PNG files into a directory.
///
/// The resource path it returns (`/avatars/<name>.png`) is what the HTTP
/// layer serves back and what gets recorded on the profile.
pub struct AvatarDir {
    dir: PathBuf,
}

impl AvatarDir {
    /// Creates an ingestor writing into `dir`. The directory is created
    /// on first ingest, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The on-disk file for a user's avatar.
    pub fn file_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.png"))
    }
}

impl AvatarIngest for AvatarDir {
    fn ingest(
        &self,
        name: &str,
        image: &[u8],
    ) -> Result<String, AvatarError> {
        if !valid_username(name) {
            return Err(AvatarError::InvalidName);
        }
        if image.is_empty() {
            return Err(AvatarError::Empty);
        }
        if image.len() > MAX_AVATAR_BYTES {
            return Err(AvatarError::TooLarge { size: image.len() });
        }

        std::fs::create_dir_all(&self.dir)?;
        let path = self.file_for(name);
        std::fs::write(&path, image)?;

        tracing::info!(name, path = %path.display(), "avatar stored");
        Ok(format!("/avatars/{name}.png"))
    }
}

/// Media host integration
///
/// Post images and avatars live on an external image host. `MediaHost` is the
/// seam; `CloudinaryClient` is the production implementation.
pub mod cloudinary;

use crate::models::PostImage;

pub use cloudinary::{CloudinaryClient, CloudinaryConfig};

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media host request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("media host rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("media host is not configured")]
    NotConfigured,
}

/// File received from a client, held in memory until uploaded
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Destination and transformation for an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Folder below the configured root folder
    pub folder: &'static str,
    /// Square crop-to-fill size in pixels
    pub fill: Option<u32>,
}

impl UploadOptions {
    pub const POST_IMAGE: UploadOptions = UploadOptions {
        folder: "posts",
        fill: None,
    };
    pub const ACCOUNT_AVATAR: UploadOptions = UploadOptions {
        folder: "avatars",
        fill: Some(150),
    };
    pub const PROFILE_AVATAR: UploadOptions = UploadOptions {
        folder: "profile-avatars",
        fill: Some(150),
    };
}

#[async_trait::async_trait]
pub trait MediaHost: Send + Sync {
    /// Store a file and return its public URL and host id
    async fn upload(
        &self,
        file: MediaUpload,
        options: UploadOptions,
    ) -> Result<PostImage, MediaError>;

    /// Remove a stored file by host id
    async fn destroy(&self, public_id: &str) -> Result<(), MediaError>;
}

//! Cloudinary image host client.
//!
//! Uses signed uploads: the request parameters (minus `file`, `api_key` and
//! `signature`) are sorted, joined as `k=v&k=v`, suffixed with the API
//! secret and SHA-1 hashed.

use super::{MediaError, MediaHost, MediaUpload, UploadOptions};
use crate::models::PostImage;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Prefix for every folder, e.g. `persona` gives `persona/posts`
    pub root_folder: String,
    pub api_base: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("root_folder", &self.root_folder)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudinaryConfig {
    pub fn new(cloud_name: &str, api_key: &str, api_secret: &str, root_folder: &str) -> Self {
        Self {
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            root_folder: root_folder.trim_matches('/').to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.api_base.trim_end_matches('/'),
            self.cloud_name,
            action
        )
    }

    fn folder(&self, folder: &str) -> String {
        if self.root_folder.is_empty() {
            folder.to_string()
        } else {
            format!("{}/{}", self.root_folder, folder)
        }
    }
}

/// Request signature over the signable parameters
fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

pub struct CloudinaryClient {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, MediaError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { http, config })
    }

    fn signed_form(&self, params: Vec<(&'static str, String)>) -> Form {
        let signature = sign(&params, &self.config.api_secret);
        let mut form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }
        form
    }

    async fn rejected(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => "unexpected response".to_string(),
        };
        MediaError::Rejected { status, message }
    }
}

#[async_trait::async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(
        &self,
        file: MediaUpload,
        options: UploadOptions,
    ) -> Result<PostImage, MediaError> {
        if !self.config.is_configured() {
            return Err(MediaError::NotConfigured);
        }

        let mut params = vec![
            ("folder", self.config.folder(options.folder)),
            ("timestamp", chrono::Utc::now().timestamp().to_string()),
        ];
        if let Some(size) = options.fill {
            params.push(("transformation", format!("c_fill,h_{},w_{}", size, size)));
        }

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let form = self.signed_form(params).part("file", part);

        let response = self
            .http
            .post(self.config.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body: UploadResponse = response.json().await?;
        tracing::debug!(public_id = %body.public_id, folder = options.folder, "image uploaded");

        Ok(PostImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        if !self.config.is_configured() {
            return Err(MediaError::NotConfigured);
        }

        let params = vec![
            ("public_id", public_id.to_string()),
            ("timestamp", chrono::Utc::now().timestamp().to_string()),
        ];

        let response = self
            .http
            .post(self.config.endpoint("destroy"))
            .multipart(self.signed_form(params))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(MediaError::Rejected {
                status: 200,
                message: other.to_string(),
            }),
        }
    }
}

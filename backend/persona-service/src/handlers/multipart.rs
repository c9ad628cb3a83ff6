//! Buffered multipart form reading for image uploads.

use crate::error::{AppError, Result};
use crate::media::MediaUpload;
use actix_multipart::Multipart;
use futures::StreamExt;
use std::collections::HashMap;

/// Largest accepted image
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const MAX_TEXT_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_bytes: usize,
}

impl UploadLimits {
    pub const SINGLE_IMAGE: UploadLimits = UploadLimits {
        max_files: 1,
        max_file_bytes: MAX_IMAGE_BYTES,
    };

    pub const fn images(max_files: usize) -> Self {
        Self {
            max_files,
            max_file_bytes: MAX_IMAGE_BYTES,
        }
    }
}

/// Text fields and files of a multipart body, keyed by field name
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<MediaUpload>>,
}

impl MultipartForm {
    /// First value of a text field
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of a repeated text field, including `name[]` entries
    pub fn texts(&self, name: &str) -> Vec<String> {
        let bracketed = format!("{}[]", name);
        [name, bracketed.as_str()]
            .iter()
            .filter_map(|key| self.fields.get(*key))
            .flatten()
            .cloned()
            .collect()
    }

    pub fn take_files(&mut self, name: &str) -> Vec<MediaUpload> {
        self.files.remove(name).unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<MediaUpload> {
        self.take_files(name).into_iter().next()
    }
}

/// Read a whole multipart body into memory, enforcing `limits` on files
///
/// Parts with a filename are files and must be images; other parts are
/// UTF-8 text fields. Empty file parts (no file chosen) are skipped.
pub async fn read_form(mut payload: Multipart, limits: UploadLimits) -> Result<MultipartForm> {
    let mut form = MultipartForm::default();
    let mut file_count = 0usize;

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let is_image = field
            .content_type()
            .is_some_and(|m| m.type_() == mime::IMAGE);
        let content_type = field
            .content_type()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();

        let max_bytes = if file_name.is_some() {
            limits.max_file_bytes
        } else {
            MAX_TEXT_BYTES
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data =
                chunk.map_err(|e| AppError::BadRequest(format!("Upload read error: {}", e)))?;
            if bytes.len() + data.len() > max_bytes {
                return Err(AppError::BadRequest(format!(
                    "Field '{}' exceeds the {} byte limit",
                    name, max_bytes
                )));
            }
            bytes.extend_from_slice(&data);
        }

        match file_name {
            Some(file_name) => {
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }

                if !is_image {
                    return Err(AppError::BadRequest(
                        "Please upload only image files".to_string(),
                    ));
                }

                file_count += 1;
                if file_count > limits.max_files {
                    return Err(AppError::BadRequest(format!(
                        "Too many files; at most {} allowed",
                        limits.max_files
                    )));
                }

                form.files.entry(name).or_default().push(MediaUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            None => {
                let value = String::from_utf8(bytes).map_err(|_| {
                    AppError::BadRequest(format!("Field '{}' is not valid UTF-8", name))
                })?;
                form.fields.entry(name).or_default().push(value);
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(fields: &[(&str, &str)]) -> MultipartForm {
        let mut form = MultipartForm::default();
        for (k, v) in fields {
            form.fields
                .entry(k.to_string())
                .or_default()
                .push(v.to_string());
        }
        form
    }

    #[test]
    fn test_repeated_fields_include_bracketed() {
        let form = form_with(&[("hashtags", "a"), ("hashtags[]", "b"), ("caption", "hi")]);
        assert_eq!(form.texts("hashtags"), vec!["a", "b"]);
        assert_eq!(form.text("caption"), Some("hi"));
        assert_eq!(form.text("missing"), None);
    }

    #[test]
    fn test_take_file_consumes() {
        let mut form = MultipartForm::default();
        form.files.entry("avatar".into()).or_default().push(MediaUpload {
            file_name: "a.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        });
        assert!(form.take_file("avatar").is_some());
        assert!(form.take_file("avatar").is_none());
    }
}

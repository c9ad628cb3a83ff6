/// Profile service - personas under an account
use super::hashtags::normalize_interests;
use super::load_owned_profile;
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::media::{MediaHost, MediaUpload, UploadOptions};
use crate::models::{CreateProfileRequest, Profile, UpdateProfileRequest};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct ProfileService {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaHost>,
    default_avatar: String,
}

fn profile_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError(
            "Please provide a profile name".to_string(),
        ));
    }
    Ok(name.to_string())
}

impl ProfileService {
    pub fn new(
        store: Arc<dyn Store>,
        media: Arc<dyn MediaHost>,
        default_avatar: impl Into<String>,
    ) -> Self {
        Self {
            store,
            media,
            default_avatar: default_avatar.into(),
        }
    }

    pub async fn list(&self, account_id: Uuid) -> Result<Vec<Profile>> {
        Ok(self.store.profiles_for_account(account_id).await?)
    }

    pub async fn get(&self, account_id: Uuid, profile_id: Uuid) -> Result<Profile> {
        load_owned_profile(self.store.as_ref(), account_id, profile_id, "access").await
    }

    /// New profiles are never default
    pub async fn create(&self, account_id: Uuid, req: CreateProfileRequest) -> Result<Profile> {
        req.validate()?;

        let profile = Profile {
            id: Uuid::new_v4(),
            account_id,
            name: profile_name(&req.name)?,
            avatar: self.default_avatar.clone(),
            bio: req.bio.unwrap_or_default(),
            is_default: false,
            interests: normalize_interests(req.interests.unwrap_or_default()),
            created_at: Utc::now(),
        };

        self.store.insert_profile(&profile).await?;
        tracing::info!(%account_id, profile_id = %profile.id, "profile created");

        Ok(profile)
    }

    /// Partial update. The default flag cannot move: it can be neither
    /// cleared on the default profile nor set on another one.
    pub async fn update(
        &self,
        account_id: Uuid,
        profile_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<Profile> {
        let mut profile =
            load_owned_profile(self.store.as_ref(), account_id, profile_id, "update").await?;

        match req.is_default {
            Some(false) if profile.is_default => {
                return Err(AppError::BadRequest(
                    "Cannot change default status of main profile".to_string(),
                ))
            }
            Some(true) if !profile.is_default => {
                return Err(AppError::BadRequest(
                    "Only the main profile can be the default profile".to_string(),
                ))
            }
            _ => {}
        }

        req.validate()?;

        if let Some(name) = req.name.as_deref() {
            profile.name = profile_name(name)?;
        }
        if let Some(bio) = req.bio {
            profile.bio = bio;
        }
        if let Some(interests) = req.interests {
            profile.interests = normalize_interests(interests);
        }

        self.store.update_profile(&profile).await?;
        Ok(profile)
    }

    pub async fn delete(&self, account_id: Uuid, profile_id: Uuid) -> Result<()> {
        let profile =
            load_owned_profile(self.store.as_ref(), account_id, profile_id, "delete").await?;

        if profile.is_default {
            return Err(AppError::BadRequest(
                "Cannot delete the default profile".to_string(),
            ));
        }

        self.store.delete_profile(profile.id).await?;
        tracing::info!(%account_id, %profile_id, "profile deleted");
        Ok(())
    }

    pub async fn update_avatar(
        &self,
        account_id: Uuid,
        profile_id: Uuid,
        upload: Option<MediaUpload>,
    ) -> Result<Profile> {
        let mut profile =
            load_owned_profile(self.store.as_ref(), account_id, profile_id, "update").await?;

        let upload = upload
            .ok_or_else(|| AppError::BadRequest("Please upload an image file".to_string()))?;

        let image = self
            .media
            .upload(upload, UploadOptions::PROFILE_AVATAR)
            .await
            .map_err(|e| AppError::media("Problem with image upload", e))?;

        profile.avatar = image.url;
        self.store.update_profile(&profile).await?;
        Ok(profile)
    }
}

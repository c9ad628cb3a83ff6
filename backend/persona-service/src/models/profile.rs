use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Persona owned by an account. Each account has exactly one default profile.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub account_id: Uuid,
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub is_default: bool,
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.account_id == account_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub is_default: bool,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            is_default: profile.is_default,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProfileRequest {
    #[validate(length(max = 30, message = "Profile name cannot be more than 30 characters"))]
    pub name: String,
    #[validate(length(max = 150, message = "Bio cannot be more than 150 characters"))]
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 30, message = "Profile name cannot be more than 30 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 150, message = "Bio cannot be more than 150 characters"))]
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
    pub is_default: Option<bool>,
}

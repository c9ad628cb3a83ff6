use super::profile::ProfileSummary;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// Hardcoded pattern; a failure here is a source bug, not a runtime condition
static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("hardcoded username regex is invalid")
});

/// Whether `username` only uses letters, digits and underscores
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_PATTERN.is_match(username)
}

/// Login identity. The password hash never leaves the service.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: String,
    pub bio: String,
    pub website: String,
    pub created_at: DateTime<Utc>,
}

/// Account together with the summaries of its profiles
#[derive(Debug, Clone, Serialize)]
pub struct AccountWithProfiles {
    #[serde(flatten)]
    pub account: Account,
    pub profiles: Vec<ProfileSummary>,
}

/// Row returned by user search
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSearchHit {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
}

impl From<&Account> for AccountSearchHit {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            full_name: account.full_name.clone(),
            avatar: account.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "Full name must be between 1 and 50 characters"))]
    pub full_name: String,
    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"))]
    pub username: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Partial update of account settings; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 50, message = "Full name must be between 1 and 50 characters"))]
    pub full_name: Option<String>,
    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"))]
    pub username: Option<String>,
    #[validate(length(max = 150, message = "Bio cannot be more than 150 characters"))]
    pub bio: Option<String>,
    #[validate(length(max = 200, message = "Website cannot be more than 200 characters"))]
    pub website: Option<String>,
}

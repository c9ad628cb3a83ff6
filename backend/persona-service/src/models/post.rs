use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Image stored on the media host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    pub url: String,
    pub public_id: String,
}

/// Comment embedded in its post, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    #[serde(rename = "profile")]
    pub profile_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Post as stored
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub account_id: Uuid,
    #[serde(rename = "profile")]
    pub profile_id: Uuid,
    pub caption: String,
    pub images: Vec<PostImage>,
    pub hashtags: Vec<String>,
    /// Profile ids, each at most once
    pub likes: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.account_id == account_id
    }
}

/// Profile as shown next to a post or comment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    /// Username of the owning account; absent if the account is gone
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    /// `None` when the commenting profile has since been deleted
    pub profile: Option<AuthorView>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Post with its profile and comment authors resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub user: Uuid,
    pub profile: Option<AuthorView>,
    pub caption: String,
    pub images: Vec<PostImage>,
    pub hashtags: Vec<String>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePostRequest {
    #[validate(length(max = 2200, message = "Caption cannot be more than 2200 characters"))]
    pub caption: Option<String>,
    pub hashtags: Option<Vec<String>>,
}

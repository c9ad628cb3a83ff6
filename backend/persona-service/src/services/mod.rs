/// Business logic layer for persona-service
///
/// - `accounts`: registration, login, account settings and search
/// - `profiles`: persona management under an account
/// - `posts`: post lifecycle, feeds, likes and comments
/// - `feed`, `engagement`, `hashtags`: pure rules used by the services
pub mod accounts;
pub mod engagement;
pub mod feed;
pub mod hashtags;
pub mod posts;
pub mod profiles;

pub use accounts::{AccountService, AuthSession};
pub use feed::{PageQuery, Paginated, Pagination};
pub use posts::{NewPost, PostService};
pub use profiles::ProfileService;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::Profile;
use uuid::Uuid;

/// Load a profile and require that `account_id` owns it
///
/// Missing profile is 404; a profile owned by someone else is 401 with
/// `Not authorized to {action} this profile`.
pub(crate) async fn load_owned_profile(
    store: &dyn Store,
    account_id: Uuid,
    profile_id: Uuid,
    action: &str,
) -> Result<Profile> {
    let profile = store
        .find_profile(profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile not found with id {}", profile_id)))?;

    if !profile.is_owned_by(account_id) {
        tracing::warn!(%account_id, %profile_id, action, "profile ownership check failed");
        return Err(AppError::Unauthorized(format!(
            "Not authorized to {} this profile",
            action
        )));
    }

    Ok(profile)
}

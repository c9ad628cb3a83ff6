/// Storage layer
///
/// Repository traits for accounts, profiles and posts, implemented by
/// `PgStore` (PostgreSQL) and `MemoryStore` (in-process, for tests and
/// local runs without a database).
pub mod account_repo;
pub mod memory;
pub mod post_repo;
pub mod profile_repo;

use crate::models::{Account, Post, Profile};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

pub use memory::MemoryStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint hit; carries the field name
    #[error("duplicate value for {0}")]
    Duplicate(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored document could not be decoded
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Predicate selecting posts for a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    All,
    /// Posts sharing at least one hashtag with the set
    HashtagsAny(Vec<String>),
    /// Posts published from one profile
    Profile(Uuid),
    Nothing,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostFilter::All => true,
            PostFilter::HashtagsAny(tags) => post.hashtags.iter().any(|h| tags.contains(h)),
            PostFilter::Profile(profile_id) => post.profile_id == *profile_id,
            PostFilter::Nothing => false,
        }
    }
}

/// Window into a listing sorted newest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

#[async_trait::async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account together with its default profile, atomically
    async fn register_account(&self, account: &Account, default_profile: &Profile)
        -> StoreResult<()>;

    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>>;

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>>;

    /// Overwrite the mutable settings (name, username, bio, website, avatar)
    async fn update_account(&self, account: &Account) -> StoreResult<()>;

    /// Case-insensitive substring match on username or full name
    async fn search_accounts(&self, query: &str) -> StoreResult<Vec<Account>>;

    /// Usernames keyed by account id; unknown ids are absent from the map
    async fn usernames(&self, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, String>>;
}

#[async_trait::async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn insert_profile(&self, profile: &Profile) -> StoreResult<()>;

    async fn find_profile(&self, id: Uuid) -> StoreResult<Option<Profile>>;

    /// All profiles of an account, oldest first
    async fn profiles_for_account(&self, account_id: Uuid) -> StoreResult<Vec<Profile>>;

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>>;

    async fn update_profile(&self, profile: &Profile) -> StoreResult<()>;

    /// Returns whether a row was removed
    async fn delete_profile(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert_post(&self, post: &Post) -> StoreResult<()>;

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>>;

    /// Last-write-wins overwrite of caption, hashtags, likes and comments
    async fn update_post(&self, post: &Post) -> StoreResult<()>;

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool>;

    /// Matching posts, newest first, within the window
    async fn find_posts(&self, filter: &PostFilter, window: PageWindow) -> StoreResult<Vec<Post>>;

    async fn count_posts(&self, filter: &PostFilter) -> StoreResult<i64>;
}

/// Everything the service needs from storage
#[async_trait::async_trait]
pub trait Store: AccountRepository + ProfileRepository + PostRepository {
    /// Readiness probe
    async fn ping(&self) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[async_trait::async_trait]
impl AccountRepository for PgStore {
    async fn register_account(
        &self,
        account: &Account,
        default_profile: &Profile,
    ) -> StoreResult<()> {
        account_repo::register_account(&self.pool, account, default_profile).await
    }

    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(account_repo::find_account_by_id(&self.pool, id).await?)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(account_repo::find_account_by_email(&self.pool, email).await?)
    }

    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        Ok(account_repo::find_account_by_username(&self.pool, username).await?)
    }

    async fn update_account(&self, account: &Account) -> StoreResult<()> {
        account_repo::update_account(&self.pool, account).await
    }

    async fn search_accounts(&self, query: &str) -> StoreResult<Vec<Account>> {
        Ok(account_repo::search_accounts(&self.pool, query).await?)
    }

    async fn usernames(&self, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, String>> {
        Ok(account_repo::usernames_by_ids(&self.pool, ids).await?)
    }
}

#[async_trait::async_trait]
impl ProfileRepository for PgStore {
    async fn insert_profile(&self, profile: &Profile) -> StoreResult<()> {
        Ok(profile_repo::insert_profile(&self.pool, profile).await?)
    }

    async fn find_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        Ok(profile_repo::find_profile_by_id(&self.pool, id).await?)
    }

    async fn profiles_for_account(&self, account_id: Uuid) -> StoreResult<Vec<Profile>> {
        Ok(profile_repo::find_profiles_by_account(&self.pool, account_id).await?)
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        Ok(profile_repo::find_profiles_by_ids(&self.pool, ids).await?)
    }

    async fn update_profile(&self, profile: &Profile) -> StoreResult<()> {
        Ok(profile_repo::update_profile(&self.pool, profile).await?)
    }

    async fn delete_profile(&self, id: Uuid) -> StoreResult<bool> {
        Ok(profile_repo::delete_profile(&self.pool, id).await?)
    }
}

#[async_trait::async_trait]
impl PostRepository for PgStore {
    async fn insert_post(&self, post: &Post) -> StoreResult<()> {
        Ok(post_repo::insert_post(&self.pool, post).await?)
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        post_repo::find_post_by_id(&self.pool, id).await
    }

    async fn update_post(&self, post: &Post) -> StoreResult<()> {
        Ok(post_repo::update_post(&self.pool, post).await?)
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        Ok(post_repo::delete_post(&self.pool, id).await?)
    }

    async fn find_posts(&self, filter: &PostFilter, window: PageWindow) -> StoreResult<Vec<Post>> {
        post_repo::find_posts(&self.pool, filter, window).await
    }

    async fn count_posts(&self, filter: &PostFilter) -> StoreResult<i64> {
        Ok(post_repo::count_posts(&self.pool, filter).await?)
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post_with(profile_id: Uuid, hashtags: &[&str]) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            profile_id,
            caption: String::new(),
            images: vec![],
            hashtags: hashtags.iter().map(|h| h.to_string()).collect(),
            likes: vec![],
            comments: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_filter_matches() {
        let profile_id = Uuid::new_v4();
        let post = post_with(profile_id, &["rust", "travel"]);

        assert!(PostFilter::All.matches(&post));
        assert!(!PostFilter::Nothing.matches(&post));
        assert!(PostFilter::Profile(profile_id).matches(&post));
        assert!(!PostFilter::Profile(Uuid::new_v4()).matches(&post));
        assert!(PostFilter::HashtagsAny(vec!["travel".into()]).matches(&post));
        assert!(!PostFilter::HashtagsAny(vec!["food".into()]).matches(&post));
        assert!(!PostFilter::HashtagsAny(vec![]).matches(&post));
    }
}

//! In-process store used by tests and `STORAGE_BACKEND=memory`.
//!
//! Mirrors the PostgreSQL constraints that matter to the service: unique
//! email and username, newest-first ordering, profile posts kept when the
//! profile is deleted.

use super::{
    AccountRepository, PageWindow, PostFilter, PostRepository, ProfileRepository, Store,
    StoreError, StoreResult,
};
use crate::models::{Account, Post, Profile};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<Uuid, Account>,
    profiles: HashMap<Uuid, Profile>,
    posts: HashMap<Uuid, Post>,
}

impl MemoryState {
    fn check_unique(&self, account: &Account) -> StoreResult<()> {
        for existing in self.accounts.values() {
            if existing.id == account.id {
                continue;
            }
            if existing.email == account.email {
                return Err(StoreError::Duplicate("email"));
            }
            if existing.username == account.username {
                return Err(StoreError::Duplicate("username"));
            }
        }
        Ok(())
    }

    fn matching_posts(&self, filter: &PostFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.values().filter(|p| filter.matches(p)).collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AccountRepository for MemoryStore {
    async fn register_account(
        &self,
        account: &Account,
        default_profile: &Profile,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.check_unique(account)?;
        state.accounts.insert(account.id, account.clone());
        state
            .profiles
            .insert(default_profile.id, default_profile.clone());
        Ok(())
    }

    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.state.read().await.accounts.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn update_account(&self, account: &Account) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.check_unique(account)?;
        if let Some(existing) = state.accounts.get_mut(&account.id) {
            existing.full_name = account.full_name.clone();
            existing.username = account.username.clone();
            existing.bio = account.bio.clone();
            existing.website = account.website.clone();
            existing.avatar = account.avatar.clone();
        }
        Ok(())
    }

    async fn search_accounts(&self, query: &str) -> StoreResult<Vec<Account>> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        let mut hits: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| {
                a.username.to_lowercase().contains(&needle)
                    || a.full_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(hits)
    }

    async fn usernames(&self, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, String>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.accounts.get(id).map(|a| (*id, a.username.clone())))
            .collect())
    }
}

#[async_trait::async_trait]
impl ProfileRepository for MemoryStore {
    async fn insert_profile(&self, profile: &Profile) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn find_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        Ok(self.state.read().await.profiles.get(&id).cloned())
    }

    async fn profiles_for_account(&self, account_id: Uuid) -> StoreResult<Vec<Profile>> {
        let state = self.state.read().await;
        let mut profiles: Vec<Profile> = state
            .profiles
            .values()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(profiles)
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.profiles.get(id).cloned())
            .collect())
    }

    async fn update_profile(&self, profile: &Profile) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.profiles.get_mut(&profile.id) {
            *existing = profile.clone();
        }
        Ok(())
    }

    async fn delete_profile(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.write().await.profiles.remove(&id).is_some())
    }
}

#[async_trait::async_trait]
impl PostRepository for MemoryStore {
    async fn insert_post(&self, post: &Post) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn update_post(&self, post: &Post) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.posts.get_mut(&post.id) {
            existing.caption = post.caption.clone();
            existing.hashtags = post.hashtags.clone();
            existing.likes = post.likes.clone();
            existing.comments = post.comments.clone();
            existing.updated_at = post.updated_at;
        }
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.write().await.posts.remove(&id).is_some())
    }

    async fn find_posts(&self, filter: &PostFilter, window: PageWindow) -> StoreResult<Vec<Post>> {
        let state = self.state.read().await;
        let offset = usize::try_from(window.offset).unwrap_or(0);
        let limit = usize::try_from(window.limit).unwrap_or(0);
        Ok(state
            .matching_posts(filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_posts(&self, filter: &PostFilter) -> StoreResult<i64> {
        let state = self.state.read().await;
        let count = state.posts.values().filter(|p| filter.matches(p)).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Post service - post lifecycle, feeds, likes and comments
use super::engagement::{self, LikeOutcome};
use super::feed::{feed_filter, Paginated, Pagination};
use super::hashtags::{extract_hashtags, merge_hashtags, normalize_tags};
use super::load_owned_profile;
use crate::db::{PostFilter, Store};
use crate::error::{AppError, Result};
use crate::media::{MediaHost, MediaUpload, UploadOptions};
use crate::models::{
    AuthorView, CommentView, Post, PostImage, PostView, Profile, UpdatePostRequest,
};
use chrono::Utc;
use futures::future::{join_all, try_join_all};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub const MAX_POST_IMAGES: usize = 10;
pub const MAX_CAPTION_CHARS: usize = 2200;

/// Input for a new post, assembled from the multipart form
#[derive(Debug, Default)]
pub struct NewPost {
    pub profile_id: Option<Uuid>,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub images: Vec<MediaUpload>,
}

pub struct PostService {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaHost>,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>, media: Arc<dyn MediaHost>) -> Self {
        Self { store, media }
    }

    async fn load_post(&self, post_id: Uuid) -> Result<Post> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post not found with id {}", post_id)))
    }

    /// Resolve post and comment authors for a batch of posts
    async fn compose(&self, posts: Vec<Post>) -> Result<Vec<PostView>> {
        let mut profile_ids: HashSet<Uuid> = HashSet::new();
        for post in &posts {
            profile_ids.insert(post.profile_id);
            profile_ids.extend(post.comments.iter().map(|c| c.profile_id));
        }
        let profile_ids: Vec<Uuid> = profile_ids.into_iter().collect();

        let profiles: HashMap<Uuid, Profile> = self
            .store
            .profiles_by_ids(&profile_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let account_ids: Vec<Uuid> = profiles
            .values()
            .map(|p| p.account_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let usernames = self.store.usernames(&account_ids).await?;

        let author = |profile_id: Uuid| -> Option<AuthorView> {
            profiles.get(&profile_id).map(|p| AuthorView {
                id: p.id,
                name: p.name.clone(),
                avatar: p.avatar.clone(),
                username: usernames.get(&p.account_id).cloned(),
            })
        };

        Ok(posts
            .into_iter()
            .map(|post| PostView {
                id: post.id,
                user: post.account_id,
                profile: author(post.profile_id),
                comments: post
                    .comments
                    .into_iter()
                    .map(|c| CommentView {
                        id: c.id,
                        profile: author(c.profile_id),
                        text: c.text,
                        created_at: c.created_at,
                    })
                    .collect(),
                caption: post.caption,
                images: post.images,
                hashtags: post.hashtags,
                likes: post.likes,
                created_at: post.created_at,
                updated_at: post.updated_at,
            })
            .collect())
    }

    async fn compose_one(&self, post: Post) -> Result<PostView> {
        self.compose(vec![post])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("post view composition returned nothing".into()))
    }

    async fn list(&self, filter: PostFilter, pagination: Pagination) -> Result<Paginated<PostView>> {
        let count = self.store.count_posts(&filter).await?;
        let posts = self.store.find_posts(&filter, pagination.window()).await?;
        let views = self.compose(posts).await?;
        Ok(Paginated::new(views, count, pagination))
    }

    /// Feed for one of the requester's profiles
    pub async fn feed(
        &self,
        account_id: Uuid,
        profile_id: Uuid,
        pagination: Pagination,
    ) -> Result<Paginated<PostView>> {
        let profile = load_owned_profile(self.store.as_ref(), account_id, profile_id, "access")
            .await?;
        let filter = feed_filter(&profile);
        tracing::debug!(%profile_id, ?filter, page = pagination.page, "serving feed");
        self.list(filter, pagination).await
    }

    /// Posts published from any existing profile
    pub async fn by_profile(
        &self,
        profile_id: Uuid,
        pagination: Pagination,
    ) -> Result<Paginated<PostView>> {
        if self.store.find_profile(profile_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Profile not found with id {}",
                profile_id
            )));
        }
        self.list(PostFilter::Profile(profile_id), pagination).await
    }

    pub async fn get(&self, post_id: Uuid) -> Result<PostView> {
        let post = self.load_post(post_id).await?;
        self.compose_one(post).await
    }

    /// Upload all images concurrently; on any failure destroy the ones that
    /// made it and fail the whole operation.
    async fn upload_images(&self, files: Vec<MediaUpload>) -> Result<Vec<PostImage>> {
        let results = join_all(
            files
                .into_iter()
                .map(|file| self.media.upload(file, UploadOptions::POST_IMAGE)),
        )
        .await;

        let mut uploaded = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(image) => uploaded.push(image),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        let Some(error) = first_error else {
            return Ok(uploaded);
        };

        tracing::warn!(
            uploaded = uploaded.len(),
            error = %error,
            "image upload failed; removing partial uploads"
        );
        let cleanup = join_all(uploaded.iter().map(|image| self.media.destroy(&image.public_id)))
            .await;
        for (image, result) in uploaded.iter().zip(cleanup) {
            if let Err(e) = result {
                tracing::warn!(public_id = %image.public_id, error = %e, "orphaned image left on media host");
            }
        }

        Err(AppError::media("Problem with image upload", error))
    }

    pub async fn create(&self, account_id: Uuid, input: NewPost) -> Result<Post> {
        let profile_id = input.profile_id.ok_or_else(|| {
            AppError::BadRequest("Please provide a profile ID".to_string())
        })?;
        let profile =
            load_owned_profile(self.store.as_ref(), account_id, profile_id, "post from").await?;

        if input.images.is_empty() {
            return Err(AppError::BadRequest(
                "Please upload at least one image".to_string(),
            ));
        }
        if input.images.len() > MAX_POST_IMAGES {
            return Err(AppError::BadRequest(format!(
                "A post can have at most {} images",
                MAX_POST_IMAGES
            )));
        }

        let caption = input.caption.trim().to_string();
        if caption.chars().count() > MAX_CAPTION_CHARS {
            return Err(AppError::ValidationError(
                "Caption cannot be more than 2200 characters".to_string(),
            ));
        }

        let hashtags = merge_hashtags(&input.hashtags, &caption);
        let images = self.upload_images(input.images).await?;
        let now = Utc::now();

        let post = Post {
            id: Uuid::new_v4(),
            account_id,
            profile_id: profile.id,
            caption,
            images,
            hashtags,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.store.insert_post(&post).await {
            tracing::error!(post_id = %post.id, "post insert failed after upload: {}", e);
            for image in &post.images {
                if let Err(err) = self.media.destroy(&image.public_id).await {
                    tracing::warn!(public_id = %image.public_id, error = %err, "orphaned image left on media host");
                }
            }
            return Err(e.into());
        }

        tracing::info!(post_id = %post.id, %profile_id, images = post.images.len(), "post created");
        Ok(post)
    }

    /// Caption replaces when given. Tags written in a new caption replace the
    /// post's tags; otherwise the explicit list, or the existing tags, apply.
    pub async fn update(
        &self,
        account_id: Uuid,
        post_id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Post> {
        let mut post = self.load_post(post_id).await?;
        if !post.is_owned_by(account_id) {
            return Err(AppError::Unauthorized(
                "Not authorized to update this post".to_string(),
            ));
        }

        req.validate()?;

        let mut caption_tags = Vec::new();
        if let Some(caption) = req.caption {
            post.caption = caption.trim().to_string();
            caption_tags = extract_hashtags(&post.caption);
        }
        if !caption_tags.is_empty() {
            post.hashtags = caption_tags;
        } else if let Some(explicit) = req.hashtags {
            post.hashtags = normalize_tags(explicit);
        }
        post.updated_at = Utc::now();

        self.store.update_post(&post).await?;
        Ok(post)
    }

    /// Images are destroyed first; if that fails the post is kept
    pub async fn delete(&self, account_id: Uuid, post_id: Uuid) -> Result<()> {
        let post = self.load_post(post_id).await?;
        if !post.is_owned_by(account_id) {
            return Err(AppError::Unauthorized(
                "Not authorized to delete this post".to_string(),
            ));
        }

        try_join_all(
            post.images
                .iter()
                .filter(|image| !image.public_id.is_empty())
                .map(|image| self.media.destroy(&image.public_id)),
        )
        .await
        .map_err(|e| AppError::media("Problem deleting post images", e))?;

        self.store.delete_post(post.id).await?;
        tracing::info!(%post_id, "post deleted");
        Ok(())
    }

    pub async fn toggle_like(
        &self,
        account_id: Uuid,
        post_id: Uuid,
        profile_id: Option<Uuid>,
    ) -> Result<PostView> {
        let profile_id = profile_id
            .ok_or_else(|| AppError::BadRequest("Please provide a profile ID".to_string()))?;
        load_owned_profile(self.store.as_ref(), account_id, profile_id, "like from").await?;

        let mut post = self.load_post(post_id).await?;
        let outcome = engagement::toggle_like(&mut post.likes, profile_id);
        post.updated_at = Utc::now();
        self.store.update_post(&post).await?;

        tracing::debug!(%post_id, %profile_id, liked = (outcome == LikeOutcome::Liked), "like toggled");
        self.compose_one(post).await
    }

    pub async fn add_comment(
        &self,
        account_id: Uuid,
        post_id: Uuid,
        profile_id: Option<Uuid>,
        text: Option<String>,
    ) -> Result<PostView> {
        let (profile_id, text) = match (profile_id, text) {
            (Some(profile_id), Some(text)) => (profile_id, engagement::comment_text(&text)?),
            _ => {
                return Err(AppError::BadRequest(
                    "Please provide text and profile ID".to_string(),
                ))
            }
        };
        load_owned_profile(self.store.as_ref(), account_id, profile_id, "comment from").await?;

        let mut post = self.load_post(post_id).await?;
        engagement::add_comment(&mut post.comments, profile_id, text);
        post.updated_at = Utc::now();
        self.store.update_post(&post).await?;

        self.compose_one(post).await
    }

    /// Only the owner of the comment's profile may remove it
    pub async fn remove_comment(
        &self,
        account_id: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<PostView> {
        let mut post = self.load_post(post_id).await?;

        let comment = engagement::find_comment(&post.comments, comment_id).ok_or_else(|| {
            AppError::NotFound(format!("Comment not found with id {}", comment_id))
        })?;

        let owner = self
            .store
            .find_profile(comment.profile_id)
            .await?
            .map(|p| p.account_id);
        if owner != Some(account_id) {
            return Err(AppError::Unauthorized(
                "Not authorized to delete this comment".to_string(),
            ));
        }

        engagement::remove_comment(&mut post.comments, comment_id);
        post.updated_at = Utc::now();
        self.store.update_post(&post).await?;

        self.compose_one(post).await
    }
}

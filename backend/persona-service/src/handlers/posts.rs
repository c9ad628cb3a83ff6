/// Post handlers - posts, feeds, likes and comments
use super::multipart::{read_form, UploadLimits};
use crate::error::{AppError, Result};
use crate::models::UpdatePostRequest;
use crate::services::posts::MAX_POST_IMAGES;
use crate::services::{NewPost, PageQuery, Pagination, PostService};
use actix_middleware::AccountId;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LikeRequest {
    pub profile_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentRequest {
    pub text: Option<String>,
    pub profile_id: Option<Uuid>,
}

/// GET /posts/feed/{profile_id}?page&limit
pub async fn get_feed(
    service: web::Data<PostService>,
    account_id: AccountId,
    profile_id: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = service
        .feed(account_id.0, *profile_id, Pagination::from(&*query))
        .await?;
    Ok(super::page(page))
}

/// GET /posts/profile/{profile_id}?page&limit
pub async fn get_profile_posts(
    service: web::Data<PostService>,
    _account_id: AccountId,
    profile_id: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = service
        .by_profile(*profile_id, Pagination::from(&*query))
        .await?;
    Ok(super::page(page))
}

/// GET /posts/{id}
pub async fn get_post(
    service: web::Data<PostService>,
    _account_id: AccountId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service.get(*post_id).await?;
    Ok(super::ok(post))
}

/// POST /posts (multipart: profileId, caption, hashtags, images)
pub async fn create_post(
    service: web::Data<PostService>,
    account_id: AccountId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_form(payload, UploadLimits::images(MAX_POST_IMAGES)).await?;

    let profile_id = match form.text("profileId").map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(Uuid::parse_str(raw).map_err(|_| {
            AppError::NotFound(format!("Profile not found with id {}", raw))
        })?),
        _ => None,
    };

    let input = NewPost {
        profile_id,
        caption: form.text("caption").unwrap_or_default().to_string(),
        hashtags: form.texts("hashtags"),
        images: form.take_files("images"),
    };

    let post = service.create(account_id.0, input).await?;
    Ok(super::created(post))
}

/// PUT /posts/{id}
pub async fn update_post(
    service: web::Data<PostService>,
    account_id: AccountId,
    post_id: web::Path<Uuid>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let post = service
        .update(account_id.0, *post_id, req.into_inner())
        .await?;
    Ok(super::ok(post))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    service: web::Data<PostService>,
    account_id: AccountId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete(account_id.0, *post_id).await?;
    Ok(super::emptied())
}

/// PUT /posts/{id}/like
pub async fn toggle_like(
    service: web::Data<PostService>,
    account_id: AccountId,
    post_id: web::Path<Uuid>,
    req: web::Json<LikeRequest>,
) -> Result<HttpResponse> {
    let post = service
        .toggle_like(account_id.0, *post_id, req.profile_id)
        .await?;
    Ok(super::ok(post))
}

/// POST /posts/{id}/comment
pub async fn add_comment(
    service: web::Data<PostService>,
    account_id: AccountId,
    post_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let post = service
        .add_comment(account_id.0, *post_id, req.profile_id, req.text)
        .await?;
    Ok(super::ok(post))
}

/// DELETE /posts/{id}/comment/{comment_id}
pub async fn remove_comment(
    service: web::Data<PostService>,
    account_id: AccountId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let post = service
        .remove_comment(account_id.0, post_id, comment_id)
        .await?;
    Ok(super::ok(post))
}

/// Profile handlers - persona CRUD and avatar upload
use super::multipart::{read_form, UploadLimits};
use crate::error::Result;
use crate::models::{CreateProfileRequest, UpdateProfileRequest};
use crate::services::ProfileService;
use actix_middleware::AccountId;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// GET /profiles
pub async fn list_profiles(
    service: web::Data<ProfileService>,
    account_id: AccountId,
) -> Result<HttpResponse> {
    let profiles = service.list(account_id.0).await?;
    Ok(super::listing(profiles))
}

/// GET /profiles/{id}
pub async fn get_profile(
    service: web::Data<ProfileService>,
    account_id: AccountId,
    profile_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let profile = service.get(account_id.0, *profile_id).await?;
    Ok(super::ok(profile))
}

/// POST /profiles
pub async fn create_profile(
    service: web::Data<ProfileService>,
    account_id: AccountId,
    req: web::Json<CreateProfileRequest>,
) -> Result<HttpResponse> {
    let profile = service.create(account_id.0, req.into_inner()).await?;
    Ok(super::created(profile))
}

/// PUT /profiles/{id}
pub async fn update_profile(
    service: web::Data<ProfileService>,
    account_id: AccountId,
    profile_id: web::Path<Uuid>,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let profile = service
        .update(account_id.0, *profile_id, req.into_inner())
        .await?;
    Ok(super::ok(profile))
}

/// DELETE /profiles/{id}
pub async fn delete_profile(
    service: web::Data<ProfileService>,
    account_id: AccountId,
    profile_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete(account_id.0, *profile_id).await?;
    Ok(super::emptied())
}

/// PUT /profiles/{id}/avatar (multipart field `avatar`)
pub async fn upload_profile_avatar(
    service: web::Data<ProfileService>,
    account_id: AccountId,
    profile_id: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_form(payload, UploadLimits::SINGLE_IMAGE).await?;
    let profile = service
        .update_avatar(account_id.0, *profile_id, form.take_file("avatar"))
        .await?;
    Ok(super::ok(profile))
}

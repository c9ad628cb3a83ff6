/// User handlers - public lookup, account settings, avatar and search
use super::multipart::{read_form, UploadLimits};
use crate::error::Result;
use crate::models::UpdateAccountRequest;
use crate::services::AccountService;
use actix_middleware::AccountId;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// GET /users/{username} (public)
pub async fn get_by_username(
    service: web::Data<AccountService>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let account = service.by_username(&username).await?;
    Ok(super::ok(account))
}

/// PUT /users/profile
pub async fn update_settings(
    service: web::Data<AccountService>,
    account_id: AccountId,
    req: web::Json<UpdateAccountRequest>,
) -> Result<HttpResponse> {
    let account = service
        .update_settings(account_id.0, req.into_inner())
        .await?;
    Ok(super::ok(account))
}

/// PUT /users/avatar (multipart field `avatar`)
pub async fn upload_avatar(
    service: web::Data<AccountService>,
    account_id: AccountId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_form(payload, UploadLimits::SINGLE_IMAGE).await?;
    let account = service
        .update_avatar(account_id.0, form.take_file("avatar"))
        .await?;
    Ok(super::ok(account))
}

/// GET /users/search?query=
pub async fn search(
    service: web::Data<AccountService>,
    _account_id: AccountId,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let hits = service.search(query.query.as_deref()).await?;
    Ok(super::listing(hits))
}

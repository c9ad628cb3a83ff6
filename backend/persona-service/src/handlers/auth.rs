/// Auth handlers - registration, login, logout and the current account
use crate::error::Result;
use crate::models::{LoginRequest, RegisterRequest};
use crate::services::{AccountService, AuthSession};
use actix_middleware::{AccountId, TOKEN_COOKIE};
use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, HttpResponseBuilder};
use serde::Serialize;

/// Session cookie attributes
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub expire_days: i64,
    pub secure: bool,
}

impl CookieSettings {
    fn session(&self, token: String) -> Cookie<'static> {
        Cookie::build(TOKEN_COOKIE, token)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::days(self.expire_days))
            .finish()
    }

    fn logged_out(&self) -> Cookie<'static> {
        Cookie::build(TOKEN_COOKIE, "none")
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(10))
            .finish()
    }
}

#[derive(Serialize)]
struct TokenResponse<T> {
    success: bool,
    token: String,
    data: T,
}

fn token_response(status: StatusCode, session: AuthSession, cookies: &CookieSettings) -> HttpResponse {
    let cookie = cookies.session(session.token.clone());
    HttpResponseBuilder::new(status)
        .cookie(cookie)
        .json(TokenResponse {
            success: true,
            token: session.token,
            data: session.account,
        })
}

/// POST /auth/register
pub async fn register(
    service: web::Data<AccountService>,
    cookies: web::Data<CookieSettings>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let session = service.register(req.into_inner()).await?;
    Ok(token_response(StatusCode::CREATED, session, &cookies))
}

/// POST /auth/login
pub async fn login(
    service: web::Data<AccountService>,
    cookies: web::Data<CookieSettings>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let session = service.login(req.into_inner()).await?;
    Ok(token_response(StatusCode::OK, session, &cookies))
}

/// GET /auth/logout
pub async fn logout(cookies: web::Data<CookieSettings>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(cookies.logged_out())
        .json(serde_json::json!({
            "success": true,
            "message": "Logged out successfully",
        }))
}

/// GET /auth/me
pub async fn me(service: web::Data<AccountService>, account_id: AccountId) -> Result<HttpResponse> {
    let account = service.current(account_id.0).await?;
    Ok(super::ok(account))
}

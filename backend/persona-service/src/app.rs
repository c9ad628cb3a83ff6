/// Application wiring: shared state and the `/api` route table
use crate::db::Store;
use crate::error::AppError;
use crate::handlers::{self, auth::CookieSettings, health::HealthState};
use crate::media::MediaHost;
use crate::services::{AccountService, PostService, ProfileService};
use actix_middleware::JwtAuthMiddleware;
use actix_web::{web, HttpResponse};
use crypto_core::JwtKeys;
use std::sync::Arc;

/// Request bodies larger than this are rejected before parsing
const JSON_LIMIT_BYTES: usize = 1024 * 1024;

/// Services and settings shared by every worker
#[derive(Clone)]
pub struct AppState {
    accounts: web::Data<AccountService>,
    profiles: web::Data<ProfileService>,
    posts: web::Data<PostService>,
    health: web::Data<HealthState>,
    cookies: web::Data<CookieSettings>,
    jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        media: Arc<dyn MediaHost>,
        jwt: Arc<JwtKeys>,
        cookies: CookieSettings,
        default_avatar_url: &str,
    ) -> Self {
        Self {
            accounts: web::Data::new(AccountService::new(
                store.clone(),
                media.clone(),
                jwt.clone(),
                default_avatar_url,
            )),
            profiles: web::Data::new(ProfileService::new(
                store.clone(),
                media.clone(),
                default_avatar_url,
            )),
            posts: web::Data::new(PostService::new(store.clone(), media)),
            health: web::Data::new(HealthState { store }),
            cookies: web::Data::new(cookies),
            jwt,
        }
    }

    fn auth(&self) -> JwtAuthMiddleware {
        JwtAuthMiddleware::new(self.jwt.clone())
    }

    /// Register extractor configs, shared data and all routes
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(
            web::JsonConfig::default()
                .limit(JSON_LIMIT_BYTES)
                .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
        )
        .app_data(
            web::PathConfig::default()
                .error_handler(|_err, _req| AppError::NotFound("Resource not found".into()).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
        )
        .app_data(self.accounts.clone())
        .app_data(self.profiles.clone())
        .app_data(self.posts.clone())
        .app_data(self.health.clone())
        .app_data(self.cookies.clone())
        .service(
            web::scope("/api")
                .service(
                    web::scope("/health")
                        .route("", web::get().to(handlers::health::health_summary))
                        .route("/ready", web::get().to(handlers::health::readiness_summary)),
                )
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(handlers::auth::register))
                        .route("/login", web::post().to(handlers::auth::login))
                        .route("/logout", web::get().to(handlers::auth::logout))
                        .service(
                            web::resource("/me")
                                .wrap(self.auth())
                                .route(web::get().to(handlers::auth::me)),
                        ),
                )
                .service(
                    // Fixed segments first so they are not taken as usernames
                    web::scope("/users")
                        .service(
                            web::resource("/search")
                                .wrap(self.auth())
                                .route(web::get().to(handlers::users::search)),
                        )
                        .service(
                            web::resource("/profile")
                                .wrap(self.auth())
                                .route(web::put().to(handlers::users::update_settings)),
                        )
                        .service(
                            web::resource("/avatar")
                                .wrap(self.auth())
                                .route(web::put().to(handlers::users::upload_avatar)),
                        )
                        .route("/{username}", web::get().to(handlers::users::get_by_username)),
                )
                .service(
                    web::scope("/profiles")
                        .wrap(self.auth())
                        .service(
                            web::resource("")
                                .route(web::get().to(handlers::profiles::list_profiles))
                                .route(web::post().to(handlers::profiles::create_profile)),
                        )
                        .service(
                            web::resource("/{id}")
                                .route(web::get().to(handlers::profiles::get_profile))
                                .route(web::put().to(handlers::profiles::update_profile))
                                .route(web::delete().to(handlers::profiles::delete_profile)),
                        )
                        .route(
                            "/{id}/avatar",
                            web::put().to(handlers::profiles::upload_profile_avatar),
                        ),
                )
                .service(
                    web::scope("/posts")
                        .wrap(self.auth())
                        .route("/feed/{profile_id}", web::get().to(handlers::posts::get_feed))
                        .route(
                            "/profile/{profile_id}",
                            web::get().to(handlers::posts::get_profile_posts),
                        )
                        .service(
                            web::resource("").route(web::post().to(handlers::posts::create_post)),
                        )
                        .service(
                            web::resource("/{id}")
                                .route(web::get().to(handlers::posts::get_post))
                                .route(web::put().to(handlers::posts::update_post))
                                .route(web::delete().to(handlers::posts::delete_post)),
                        )
                        .route("/{id}/like", web::put().to(handlers::posts::toggle_like))
                        .route("/{id}/comment", web::post().to(handlers::posts::add_comment))
                        .route(
                            "/{id}/comment/{comment_id}",
                            web::delete().to(handlers::posts::remove_comment),
                        ),
                )
                .default_service(web::to(route_not_found)),
        );
    }
}

async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "success": false,
        "statusCode": 404,
        "message": "Route not found",
    }))
}

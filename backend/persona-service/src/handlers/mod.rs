/// HTTP handlers
///
/// - `auth`: register, login, logout, current account
/// - `users`: public account lookup, account settings, search
/// - `profiles`: persona CRUD and avatars
/// - `posts`: posts, feeds, likes and comments
/// - `health`: liveness and readiness probes
///
/// Successful responses use the envelope
/// `{ success: true, data, count?, totalPages?, currentPage? }`.
pub mod auth;
pub mod health;
pub mod multipart;
pub mod posts;
pub mod profiles;
pub mod users;

use crate::services::Paginated;
use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_pages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_page: Option<i64>,
    data: T,
}

impl<T: Serialize> Envelope<T> {
    fn data(data: T) -> Self {
        Self {
            success: true,
            count: None,
            total_pages: None,
            current_page: None,
            data,
        }
    }
}

/// 200 with `data`
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::data(data))
}

/// 201 with `data`
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(Envelope::data(data))
}

/// 200 with `data: {}`, used after deletions
pub fn emptied() -> HttpResponse {
    ok(serde_json::json!({}))
}

/// 200 with `data` and `count`
pub fn listing<T: Serialize>(items: Vec<T>) -> HttpResponse {
    let count = i64::try_from(items.len()).unwrap_or(i64::MAX);
    HttpResponse::Ok().json(Envelope {
        count: Some(count),
        ..Envelope::data(items)
    })
}

/// 200 with `data` and the pagination totals
pub fn page<T: Serialize>(page: Paginated<T>) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        success: true,
        count: Some(page.count),
        total_pages: Some(page.total_pages),
        current_page: Some(page.current_page),
        data: page.items,
    })
}

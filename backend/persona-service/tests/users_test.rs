#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use common::{bearer, create_profile, harness, register, send, MultipartBody};
use serde_json::json;

#[actix_web::test]
async fn public_lookup_by_username() {
    let h = harness();
    let app = init_app!(h);
    let session = register(&app, "famous").await;
    create_profile(&app, &session, "Gaming", &["games"]).await;

    // No session needed
    let (status, body) = send(&app, TestRequest::get().uri("/api/users/famous").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "famous");
    assert_eq!(body["data"]["fullName"], "famous Tester");
    assert!(body["data"].get("passwordHash").is_none());
    let profiles = body["data"]["profiles"].as_array().expect("profiles");
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[1]["name"], "Gaming");

    let (status, body) = send(&app, TestRequest::get().uri("/api/users/nobody").to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found with username nobody");
}

#[actix_web::test]
async fn search_matches_username_and_full_name() {
    let h = harness();
    let app = init_app!(h);
    let session = register(&app, "searcher").await;
    register(&app, "rustacean").await;
    register(&app, "gopher").await;

    let search = |query: &str| {
        bearer(
            TestRequest::get().uri(&format!("/api/users/search?query={}", query)),
            &session.token,
        )
        .to_request()
    };

    let (status, body) = send(&app, search("RUST")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["username"], "rustacean");
    assert!(body["data"][0].get("email").is_none());

    // Every test account's full name ends in "Tester"
    let (_, body) = send(&app, search("tester")).await;
    assert_eq!(body["count"], 3);

    let (status, body) = send(
        &app,
        bearer(TestRequest::get().uri("/api/users/search"), &session.token).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide a search query");

    let (status, _) = send(
        &app,
        TestRequest::get().uri("/api/users/search?query=rust").to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn update_account_settings() {
    let h = harness();
    let app = init_app!(h);
    let session = register(&app, "settler").await;
    register(&app, "taken").await;

    let update = |body: serde_json::Value| {
        bearer(TestRequest::put().uri("/api/users/profile"), &session.token)
            .set_json(body)
            .to_request()
    };

    let (status, body) = send(
        &app,
        update(json!({
            "fullName": "Settled Person",
            "bio": "Hi there",
            "website": " https://settler.dev ",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fullName"], "Settled Person");
    assert_eq!(body["data"]["bio"], "Hi there");
    assert_eq!(body["data"]["website"], "https://settler.dev");
    assert_eq!(body["data"]["username"], "settler");

    let (status, body) = send(&app, update(json!({ "username": "taken" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already taken");

    let (status, body) = send(&app, update(json!({ "bio": "x".repeat(151) }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bio cannot be more than 150 characters");

    let (status, body) = send(&app, update(json!({ "username": "renamed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "renamed");

    let (status, _) = send(&app, TestRequest::get().uri("/api/users/renamed").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, TestRequest::get().uri("/api/users/settler").to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn account_avatar_upload() {
    let h = harness();
    let app = init_app!(h);
    let session = register(&app, "pictured").await;

    let (status, body) = send(
        &app,
        MultipartBody::new()
            .image("avatar", "face.jpg")
            .attach(bearer(TestRequest::put().uri("/api/users/avatar"), &session.token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["avatar"], "https://media.test/persona/avatars/0.png");

    let (status, body) = send(
        &app,
        MultipartBody::new()
            .image("avatar", "fail.jpg")
            .attach(bearer(TestRequest::put().uri("/api/users/avatar"), &session.token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Problem with image upload");
}

#[actix_web::test]
async fn health_and_unknown_routes() {
    let h = harness();
    let app = init_app!(h);

    let (status, body) = send(&app, TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, TestRequest::get().uri("/api/health/ready").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    assert_eq!(body["storage"], "memory");

    let (status, body) = send(&app, TestRequest::get().uri("/api/nowhere").to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

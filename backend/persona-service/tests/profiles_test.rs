#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use common::{bearer, create_profile, harness, register, send, MultipartBody};
use serde_json::json;
use uuid::Uuid;

#[actix_web::test]
async fn create_and_list_profiles() {
    let h = harness();
    let app = init_app!(h);
    let session = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        bearer(TestRequest::post().uri("/api/profiles"), &session.token)
            .set_json(json!({
                "name": "  Travel  ",
                "bio": "On the road",
                "interests": [" Travel", "FOOD", "travel"],
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Travel");
    assert_eq!(body["data"]["isDefault"], false);
    assert_eq!(body["data"]["interests"], json!(["travel", "food"]));
    assert_eq!(body["data"]["user"], session.account_id.to_string());

    let (status, body) = send(
        &app,
        bearer(TestRequest::get().uri("/api/profiles"), &session.token).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["isDefault"], true);
    assert_eq!(body["data"][1]["name"], "Travel");

    let (status, body) = send(
        &app,
        bearer(TestRequest::post().uri("/api/profiles"), &session.token)
            .set_json(json!({ "name": "   " }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide a profile name");
}

#[actix_web::test]
async fn profiles_are_private_to_their_account() {
    let h = harness();
    let app = init_app!(h);
    let owner = register(&app, "owner").await;
    let intruder = register(&app, "intruder").await;
    let travel = create_profile(&app, &owner, "Travel", &["travel"]).await;

    let (status, body) = send(
        &app,
        bearer(
            TestRequest::get().uri(&format!("/api/profiles/{}", travel)),
            &intruder.token,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized to access this profile");

    let (status, body) = send(
        &app,
        bearer(
            TestRequest::put().uri(&format!("/api/profiles/{}", travel)),
            &intruder.token,
        )
        .set_json(json!({ "name": "Hijacked" }))
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized to update this profile");

    let missing = Uuid::new_v4();
    let (status, body) = send(
        &app,
        bearer(
            TestRequest::get().uri(&format!("/api/profiles/{}", missing)),
            &owner.token,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Profile not found with id {}", missing));

    let (status, body) = send(
        &app,
        bearer(TestRequest::get().uri("/api/profiles/not-a-uuid"), &owner.token).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Resource not found");
}

#[actix_web::test]
async fn default_flag_cannot_move() {
    let h = harness();
    let app = init_app!(h);
    let session = register(&app, "bob").await;
    let side = create_profile(&app, &session, "Side", &[]).await;

    let (status, body) = send(
        &app,
        bearer(
            TestRequest::put().uri(&format!("/api/profiles/{}", session.default_profile)),
            &session.token,
        )
        .set_json(json!({ "isDefault": false }))
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot change default status of main profile");

    let (status, body) = send(
        &app,
        bearer(
            TestRequest::put().uri(&format!("/api/profiles/{}", side)),
            &session.token,
        )
        .set_json(json!({ "isDefault": true }))
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Only the main profile can be the default profile"
    );

    // Restating the current flag is harmless
    let (status, body) = send(
        &app,
        bearer(
            TestRequest::put().uri(&format!("/api/profiles/{}", session.default_profile)),
            &session.token,
        )
        .set_json(json!({ "isDefault": true, "bio": "Hello", "interests": ["Rust"] }))
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bio"], "Hello");
    assert_eq!(body["data"]["interests"], json!(["rust"]));
    assert_eq!(body["data"]["name"], "Main Profile");
}

#[actix_web::test]
async fn delete_profile_rules() {
    let h = harness();
    let app = init_app!(h);
    let session = register(&app, "carol").await;
    let side = create_profile(&app, &session, "Side", &[]).await;

    let (status, body) = send(
        &app,
        bearer(
            TestRequest::delete().uri(&format!("/api/profiles/{}", session.default_profile)),
            &session.token,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete the default profile");

    let (status, body) = send(
        &app,
        bearer(
            TestRequest::delete().uri(&format!("/api/profiles/{}", side)),
            &session.token,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({}));

    let (status, _) = send(
        &app,
        bearer(
            TestRequest::get().uri(&format!("/api/profiles/{}", side)),
            &session.token,
        )
        .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn profile_avatar_upload() {
    let h = harness();
    let app = init_app!(h);
    let session = register(&app, "dave").await;
    let uri = format!("/api/profiles/{}/avatar", session.default_profile);

    let (status, body) = send(
        &app,
        MultipartBody::new()
            .image("avatar", "me.png")
            .attach(bearer(TestRequest::put().uri(&uri), &session.token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["avatar"],
        "https://media.test/persona/profile-avatars/0.png"
    );

    let (status, body) = send(
        &app,
        MultipartBody::new()
            .file("avatar", "notes.txt", "text/plain", b"hello")
            .attach(bearer(TestRequest::put().uri(&uri), &session.token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please upload only image files");

    let (status, body) = send(
        &app,
        MultipartBody::new()
            .text("caption", "no file here")
            .attach(bearer(TestRequest::put().uri(&uri), &session.token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please upload an image file");
}

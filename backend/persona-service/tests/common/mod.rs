//! Shared fixtures for HTTP-level tests: an in-memory app, a recording media
//! host and multipart body construction.
#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::test::{self, TestRequest};
use async_trait::async_trait;
use crypto_core::JwtKeys;
use persona_service::db::{MemoryStore, Store};
use persona_service::handlers::auth::CookieSettings;
use persona_service::media::{MediaError, MediaHost, MediaUpload, UploadOptions};
use persona_service::models::PostImage;
use persona_service::AppState;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_SECRET: &str = "persona-test-secret-0123456789abcdef";
pub const TEST_AVATAR: &str = "https://media.test/default-avatar.png";

/// Media host double. Uploads whose file name starts with `fail` are
/// rejected; destroys can be switched to fail.
#[derive(Default)]
pub struct FakeMediaHost {
    counter: AtomicUsize,
    fail_destroy: AtomicBool,
    uploaded: Mutex<Vec<String>>,
    destroyed: Mutex<Vec<String>>,
}

impl FakeMediaHost {
    pub fn fail_destroys(&self, fail: bool) {
        self.fail_destroy.store(fail, Ordering::SeqCst);
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().expect("uploaded lock").clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().expect("destroyed lock").clone()
    }
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    async fn upload(
        &self,
        file: MediaUpload,
        options: UploadOptions,
    ) -> Result<PostImage, MediaError> {
        if file.file_name.starts_with("fail") {
            return Err(MediaError::Rejected {
                status: 400,
                message: "Invalid image file".to_string(),
            });
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let public_id = format!("persona/{}/{}", options.folder, n);
        self.uploaded
            .lock()
            .expect("uploaded lock")
            .push(public_id.clone());

        Ok(PostImage {
            url: format!("https://media.test/{}.png", public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(MediaError::Rejected {
                status: 500,
                message: "destroy unavailable".to_string(),
            });
        }
        self.destroyed
            .lock()
            .expect("destroyed lock")
            .push(public_id.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub media: Arc<FakeMediaHost>,
    pub jwt: Arc<JwtKeys>,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let media = Arc::new(FakeMediaHost::default());
    let jwt = Arc::new(JwtKeys::from_secret(TEST_SECRET, 30));
    let cookies = CookieSettings {
        expire_days: 30,
        secure: false,
    };

    let state = AppState::new(
        store.clone() as Arc<dyn Store>,
        media.clone() as Arc<dyn MediaHost>,
        jwt.clone(),
        cookies,
        TEST_AVATAR,
    );

    Harness {
        state,
        store,
        media,
        jwt,
    }
}

/// Initialize the full route table over a harness
macro_rules! init_app {
    ($harness:expr) => {{
        let state = $harness.state.clone();
        actix_web::test::init_service(
            actix_web::App::new().configure(move |cfg| state.configure(cfg)),
        )
        .await
    }};
}

fn decode(body: &[u8]) -> Value {
    if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body).expect("response body is JSON")
    }
}

/// Call the app and decode the JSON body (Null when empty)
///
/// Middleware rejections surface as service errors; they are rendered the
/// way the HTTP dispatcher would.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            let body = test::read_body(resp).await;
            (status, decode(&body))
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = actix_web::body::to_bytes(resp.into_body())
                .await
                .expect("error body readable");
            (status, decode(&body))
        }
    }
}

/// Raw response for header inspection; panics on middleware rejection
pub async fn call<S, B>(app: &S, req: Request) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    test::call_service(app, req).await
}

pub fn bearer(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

/// A registered account with its default profile
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub account_id: Uuid,
    pub username: String,
    pub default_profile: Uuid,
}

pub fn uuid_of(value: &Value) -> Uuid {
    value
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("value is a UUID string")
}

pub async fn register<S, B>(app: &S, username: &str) -> Session
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "fullName": format!("{} Tester", username),
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "secret123",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    let token = body["token"].as_str().expect("token").to_string();
    let account_id = uuid_of(&body["data"]["id"]);

    let (status, me) = send(
        app,
        bearer(TestRequest::get().uri("/api/auth/me"), &token).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let default_profile = uuid_of(&me["data"]["profiles"][0]["id"]);

    Session {
        token,
        account_id,
        username: username.to_string(),
        default_profile,
    }
}

pub async fn create_profile<S, B>(app: &S, session: &Session, name: &str, interests: &[&str]) -> Uuid
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        bearer(TestRequest::post().uri("/api/profiles"), &session.token)
            .set_json(json!({ "name": name, "interests": interests }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create profile failed: {}", body);
    uuid_of(&body["data"]["id"])
}

/// Minimal PNG header; the fake host never inspects content
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Hand-built `multipart/form-data` body
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "persona-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn image(self, name: &str, file_name: &str) -> Self {
        self.file(name, file_name, "image/png", PNG_BYTES)
    }

    /// Attach the body and its content type to `req`
    pub fn attach(mut self, req: TestRequest) -> TestRequest {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        req.insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", self.boundary),
        ))
        .set_payload(self.body)
    }
}

/// Publish a post from `profile_id` with one image per file name
pub async fn create_post<S, B>(
    app: &S,
    session: &Session,
    profile_id: Uuid,
    caption: &str,
    files: &[&str],
) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut form = MultipartBody::new()
        .text("profileId", &profile_id.to_string())
        .text("caption", caption);
    for file in files {
        form = form.image("images", file);
    }

    let (status, body) = send(
        app,
        form.attach(bearer(TestRequest::post().uri("/api/posts"), &session.token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create post failed: {}", body);
    body["data"].clone()
}

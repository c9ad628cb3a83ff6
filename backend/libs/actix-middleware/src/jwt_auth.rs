use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::StatusCode,
    Error, HttpMessage, HttpResponse,
};
use crypto_core::JwtKeys;
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

/// Cookie carrying the session token for browser clients
pub const TOKEN_COOKIE: &str = "token";

/// Account ID extracted from a validated session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountId(pub Uuid);

/// Session authentication middleware
///
/// Accepts `Authorization: Bearer <token>` or the `token` cookie. On success
/// the account id is stored in request extensions; otherwise the request is
/// rejected with a 401 JSON envelope.
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    keys: Arc<JwtKeys>,
}

impl JwtAuthMiddleware {
    pub fn new(keys: Arc<JwtKeys>) -> Self {
        Self { keys }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    keys: Arc<JwtKeys>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let keys = self.keys.clone();

        Box::pin(async move {
            let token = extract_token(&req)
                .ok_or_else(|| unauthorized("Not authorized to access this route"))?;

            let account_id = keys.account_id(&token).map_err(|e| {
                tracing::warn!("Session token rejected: {}", e);
                unauthorized("Not authorized to access this route")
            })?;

            req.extensions_mut().insert(AccountId(account_id));

            service.call(req).await
        })
    }
}

/// Bearer header first, then the session cookie
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    bearer.or_else(|| {
        req.cookie(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty() && v != "none")
    })
}

fn unauthorized(message: &str) -> Error {
    let status = StatusCode::UNAUTHORIZED;
    let response = HttpResponse::build(status).json(serde_json::json!({
        "success": false,
        "statusCode": status.as_u16(),
        "message": message,
    }));
    InternalError::from_response(message.to_string(), response).into()
}

/// FromRequest implementation for AccountId
impl actix_web::FromRequest for AccountId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<AccountId>() {
            Some(account_id) => ready(Ok(*account_id)),
            None => ready(Err(unauthorized("Not authorized to access this route"))),
        }
    }
}

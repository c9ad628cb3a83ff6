//! Request logging middleware
//!
//! Emits one tracing event per completed request with method, path, status,
//! latency and, when authentication ran first, the acting account.

use crate::jwt_auth::AccountId;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::Instant;

#[derive(Clone, Default)]
pub struct Logging;

impl<S, B> Transform<S, ServiceRequest> for Logging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggingService { service }))
    }
}

pub struct LoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for LoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match &res {
                Ok(res) => {
                    let account = res
                        .request()
                        .extensions()
                        .get::<AccountId>()
                        .map(|a| a.0.to_string());
                    let status = res.status().as_u16();

                    if status >= 500 {
                        tracing::error!(%method, %path, status, duration_ms, account = ?account, "request failed");
                    } else {
                        tracing::info!(%method, %path, status, duration_ms, account = ?account, "request completed");
                    }
                }
                Err(err) => {
                    let status = err.error_response().status().as_u16();
                    tracing::warn!(%method, %path, status, duration_ms, error = %err, "request rejected");
                }
            }

            res
        })
    }
}

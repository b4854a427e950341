use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::verify_token;
use crate::config::Config;
use crate::error::AppError;

/// Routes under the guarded scope that do not need a token.
const PUBLIC_PATHS: &[&str] = &["/api/auth/signup", "/api/auth/signin", "/api/auth/signout"];

/// Bearer token guard.
///
/// Verifies `Authorization: Bearer <jwt>` and stores the decoded `Claims` in the
/// request extensions, or short-circuits with 401 before the handler runs.
/// Rejections are returned as responses, not errors, so outer middleware
/// (CORS, security headers) still decorates them.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_public(req.path()) {
            return forward(&self.service, req);
        }

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);

        let Some(token) = token else {
            return reject(req, AppError::Unauthorized("Not authenticated".into()));
        };

        let Some(config) = req.app_data::<web::Data<Config>>() else {
            return reject(
                req,
                AppError::InternalServerError("Config missing from app data".into()),
            );
        };

        match verify_token(token, &config.auth) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                forward(&self.service, req)
            }
            Err(err) => {
                log::debug!("rejected bearer token on {}", req.path());
                reject(req, err)
            }
        }
    }
}

fn forward<S, B>(
    service: &S,
    req: ServiceRequest,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    let fut = service.call(req);
    Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
}

fn reject<B>(
    req: ServiceRequest,
    err: AppError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>>
where
    B: MessageBody + 'static,
{
    let res = req.error_response(err).map_into_right_body();
    Box::pin(ready(Ok(res)))
}

fn is_public(path: &str) -> bool {
    let path = path.trim_end_matches('/');
    PUBLIC_PATHS.contains(&path)
}

/// Extracts the token from an `Authorization` header value.
/// The scheme is matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

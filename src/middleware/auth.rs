use crate::{
    config::AppConfig,
    services::auth_service::{self, Role, SESSION_COOKIE},
    utils::error::AppError,
};
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

pub use crate::services::auth_service::Claims;

/// Requires a valid session (cookie or bearer token), optionally with a role.
pub struct AuthMiddleware {
    role: Option<Role>,
}

impl AuthMiddleware {
    pub fn any() -> Self {
        Self { role: None }
    }

    pub fn require(role: Role) -> Self {
        Self { role: Some(role) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            role: self.role,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    role: Option<Role>,
}

/// Session token from the Authorization header, falling back to the cookie.
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
}

fn authorize(req: &ServiceRequest, role: Option<Role>) -> Result<Claims, AppError> {
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| AppError::Config("AppConfig missing from app data".to_string()))?;

    let token = extract_token(req)
        .ok_or_else(|| AppError::Unauthorized("Missing session".to_string()))?;

    let claims = auth_service::verify_token(config, &token)?;

    match role {
        Some(required) if claims.role != required => Err(AppError::Forbidden(format!(
            "This endpoint requires the {:?} role",
            required
        ))),
        _ => Ok(claims),
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        match authorize(&req, self.role) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);

                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(e) => {
                log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}

//! Credential middleware shared by the admin and game routes.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::{SharedState, credentials::CallerIdentity}};

const API_KEY_HEADER: &str = "x-api-key";

/// Resolve the request token and store the caller identity in the request extensions.
///
/// Accepts `X-Api-Key: <token>` or `Authorization: Bearer <token>`.
pub async fn authenticate(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&req)?;
    let identity = state
        .credentials()
        .resolve(&token)
        .ok_or_else(|| AppError::Unauthorized("unknown credential".into()))?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Reject callers that are not service credentials. Must run after [`authenticate`].
pub async fn require_service(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    match req.extensions().get::<CallerIdentity>() {
        Some(identity) if identity.is_service() => Ok(next.run(req).await),
        Some(_) => Err(AppError::Forbidden(
            "admin routes require a service credential".into(),
        )),
        None => Err(AppError::Unauthorized("missing credential".into())),
    }
}

fn extract_token(req: &Request<Body>) -> Result<String, AppError> {
    let headers = req.headers();
    if let Some(value) = headers.get(API_KEY_HEADER) {
        return value
            .to_str()
            .map(|token| token.trim().to_owned())
            .map_err(|_| AppError::Unauthorized("malformed `X-Api-Key` header".into()));
    }

    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized(
                "missing credential: provide `X-Api-Key` or `Authorization: Bearer`".into(),
            )
        })?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_owned())
        .ok_or_else(|| AppError::Unauthorized("Authorization header must use the Bearer scheme".into()))
}

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::warn;

use super::auth::AuthUser;
use crate::error::ApiError;

/// Role gate for admin-only routes. Must run after `jwt_auth_middleware`.
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before role check"))?;

    if !auth_user.is_admin() {
        warn!(
            "{} ({}) denied {} {}",
            auth_user.email,
            auth_user.role,
            request.method(),
            request.uri().path()
        );
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}

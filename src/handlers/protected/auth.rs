// handlers/protected/auth.rs - GET /api/auth/whoami handler

use axum::Extension;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::database::models::UserSummary;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoamiResponse {
    pub user: UserSummary,
    pub expires_at: Option<DateTime<Utc>>,
}

/// GET /api/auth/whoami - Identity carried by the presented token
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<WhoamiResponse> {
    Ok(ApiResponse::success(WhoamiResponse {
        expires_at: Utc.timestamp_opt(user.exp, 0).single(),
        user: user.summary(),
    }))
}

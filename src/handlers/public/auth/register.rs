// handlers/public/auth/register.rs - POST /api/register handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use crate::auth::NewAccount;
use crate::database::models::UserSummary;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserSummary,
}

/// POST /api/register - Register new standard user account
///
/// Any `role` in the body is ignored; sign-ups are always `user`.
/// 400 on missing email/password, 409 when the email is taken.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<NewAccount>, JsonRejection>,
) -> ApiResult<RegisterResponse> {
    let Json(account) = payload?;

    let user = state.auth.register(account).await?;

    Ok(ApiResponse::created(RegisterResponse {
        message: "User registered successfully.",
        user,
    }))
}

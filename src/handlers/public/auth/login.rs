// handlers/public/auth/login.rs - POST /api/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::database::models::Role;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub expires_in: u64,
}

/// POST /api/login - Authenticate user and receive JWT token
///
/// Both an unknown email and a wrong password answer 401
/// `{"message": "Invalid credentials"}`.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;

    let outcome = state.auth.login(&request.email, &request.password).await?;

    Ok(ApiResponse::success(LoginResponse {
        message: "Logged in successfully",
        token: outcome.token,
        role: outcome.user.role,
        name: outcome.user.name,
        email: outcome.user.email,
        expires_in: outcome.expires_in,
    }))
}

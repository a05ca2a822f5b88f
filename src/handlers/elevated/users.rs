// handlers/elevated/users.rs - GET /api/admin/users handler

use axum::extract::State;
use serde::Serialize;

use crate::database::models::UserSummary;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserList {
    pub message: &'static str,
    pub users: Vec<UserSummary>,
}

/// GET /api/admin/users - Accounts without password hashes
pub async fn list(State(state): State<AppState>) -> ApiResult<UserList> {
    Ok(ApiResponse::success(UserList {
        message: "Admin access granted",
        users: state.store.users.list().await,
    }))
}

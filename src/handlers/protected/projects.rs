// handlers/protected/projects.rs - read access to GRC projects

use axum::extract::{Path, State};
use serde::Serialize;

use super::parse_id;
use crate::database::models::Project;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProjectList {
    pub projects: Vec<Project>,
}

#[derive(Debug, Serialize)]
pub struct ProjectBody {
    pub project: Project,
}

/// GET /api/projects - Any authenticated user
pub async fn list(State(state): State<AppState>) -> ApiResult<ProjectList> {
    Ok(ApiResponse::success(ProjectList {
        projects: state.store.projects.list().await,
    }))
}

/// GET /api/projects/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ProjectBody> {
    let project = state.store.projects.get(parse_id(&id)?).await?;
    Ok(ApiResponse::success(ProjectBody { project }))
}

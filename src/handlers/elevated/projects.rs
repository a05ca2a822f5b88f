// handlers/elevated/projects.rs - GRC project mutations

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Serialize;
use tracing::info;

use crate::database::models::{NewProject, Project, ProjectPatch};
use crate::handlers::protected::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProjectChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub project: Project,
}

/// POST /api/projects - projectName, compliance, riskLevel and status are required
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> ApiResult<ProjectChange> {
    let Json(draft) = payload?;
    let project = state.store.projects.create(draft).await?;
    info!("{} created project {}", admin.email, project.id);

    Ok(ApiResponse::created(ProjectChange {
        message: None,
        project,
    }))
}

/// PUT /api/projects/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<ProjectPatch>, JsonRejection>,
) -> ApiResult<ProjectChange> {
    let id = parse_id(&id)?;
    let Json(patch) = payload?;
    let project = state.store.projects.update(id, patch).await?;
    info!("{} updated project {}", admin.email, id);

    Ok(ApiResponse::success(ProjectChange {
        message: None,
        project,
    }))
}

/// DELETE /api/projects/:id - Returns the removed record
pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<ProjectChange> {
    let id = parse_id(&id)?;
    let project = state.store.projects.delete(id).await?;
    info!("{} deleted project {}", admin.email, id);

    Ok(ApiResponse::success(ProjectChange {
        message: Some("Project deleted"),
        project,
    }))
}

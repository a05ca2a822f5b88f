// handlers/elevated/questions.rs - question bank mutations

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Serialize;
use tracing::info;

use crate::database::models::{NewQuestion, Question, QuestionPatch};
use crate::handlers::protected::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct QuestionChange {
    pub message: &'static str,
    pub question: Question,
}

/// POST /api/questions
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    payload: Result<Json<NewQuestion>, JsonRejection>,
) -> ApiResult<QuestionChange> {
    let Json(draft) = payload?;
    let question = state.store.questions.create(draft).await?;
    info!("{} added question {}", admin.email, question.id);

    Ok(ApiResponse::created(QuestionChange {
        message: "Question added",
        question,
    }))
}

/// PUT /api/questions/:id - Absent fields keep their value; the id never changes
pub async fn update(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<QuestionPatch>, JsonRejection>,
) -> ApiResult<QuestionChange> {
    let id = parse_id(&id)?;
    let Json(patch) = payload?;
    let question = state.store.questions.update(id, patch).await?;
    info!("{} updated question {}", admin.email, id);

    Ok(ApiResponse::success(QuestionChange {
        message: "Question updated",
        question,
    }))
}

/// DELETE /api/questions/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<QuestionChange> {
    let id = parse_id(&id)?;
    let question = state.store.questions.delete(id).await?;
    info!("{} deleted question {}", admin.email, id);

    Ok(ApiResponse::success(QuestionChange {
        message: "Question deleted",
        question,
    }))
}

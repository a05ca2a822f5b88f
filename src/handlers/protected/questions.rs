// handlers/protected/questions.rs - read access to the question bank

use axum::extract::{Path, State};
use serde::Serialize;

use super::parse_id;
use crate::database::models::Question;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct QuestionList {
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct QuestionBody {
    pub question: Question,
}

/// GET /api/questions - Full collection; filtering and paging happen client side
pub async fn list(State(state): State<AppState>) -> ApiResult<QuestionList> {
    Ok(ApiResponse::success(QuestionList {
        questions: state.store.questions.list().await,
    }))
}

/// GET /api/questions/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<QuestionBody> {
    let question = state.store.questions.get(parse_id(&id)?).await?;
    Ok(ApiResponse::success(QuestionBody { question }))
}

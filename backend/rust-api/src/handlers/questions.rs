use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    models::{Question, QuestionQuery},
    services::AppState,
};

pub async fn list_questions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuestionQuery>,
) -> impl IntoResponse {
    let bank = state.quiz.bank();
    let questions: Vec<Question> = bank
        .all()
        .filter(|q| query.tier.is_none_or(|tier| q.tier == tier))
        .filter(|q| {
            query
                .category
                .as_deref()
                .is_none_or(|category| q.category.eq_ignore_ascii_case(category))
        })
        .cloned()
        .collect();

    Json(questions)
}

pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .quiz
        .bank()
        .get(&question_id)
        .map(|question| Json(question.clone()))
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("Question not found: {}", question_id),
            )
        })
}

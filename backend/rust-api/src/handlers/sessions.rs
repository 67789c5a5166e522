use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::QuizError,
    models::{AdaptiveQuestionRequest, NextQuestionRequest, QuestionResponse, RecordResultRequest},
    services::AppState,
};

fn not_found(err: QuizError) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, err.to_string())
}

/// Unreadable bodies (bad JSON, unknown tier, wrong types) are a 400 like any
/// other invalid request on these routes.
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, (StatusCode, String)> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| (StatusCode::BAD_REQUEST, rejection.body_text()))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session = state.quiz.create_session();
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!("Getting session: {}", session_id);

    let session = state.quiz.session_state(&session_id).map_err(not_found)?;
    Ok((StatusCode::OK, Json(session)))
}

pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    tracing::info!("Ending session: {}", session_id);

    state.quiz.end_session(&session_id);
    StatusCode::NO_CONTENT
}

pub async fn next_question(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<NextQuestionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let req = parse_body(payload)?;
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let selection = match (req.tier, req.requester_level, req.counterpart_level) {
        (Some(tier), None, None) => state.quiz.select_question(&session_id, tier),
        (None, Some(requester), Some(counterpart)) => {
            state
                .quiz
                .select_question_for_levels(&session_id, requester, counterpart)
        }
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "Provide either tier or both requester_level and counterpart_level".to_string(),
            ))
        }
    }
    .map_err(not_found)?;

    tracing::info!(
        "Served question {} to session {} ({})",
        selection.question.id,
        session_id,
        selection.source.label()
    );

    Ok((StatusCode::OK, Json(QuestionResponse::from(selection))))
}

pub async fn adaptive_question(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<AdaptiveQuestionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let req = parse_body(payload)?;
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let selection = state
        .quiz
        .select_adaptive_question(&session_id, req.requester_level, req.counterpart_level)
        .map_err(not_found)?;

    Ok((StatusCode::OK, Json(QuestionResponse::from(selection))))
}

pub async fn record_result(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<RecordResultRequest>, JsonRejection>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let req = parse_body(payload)?;
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    state
        .quiz
        .record_result(&session_id, &req.question_id, req.correct)
        .map_err(not_found)?;

    Ok(StatusCode::NO_CONTENT)
}

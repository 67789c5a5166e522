use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .merge(sessions_routes())
        .merge(questions_routes())
        .with_state(app_state)
        .layer(cors)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn sessions_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/sessions", post(handlers::sessions::create_session))
        .route(
            "/api/v1/sessions/{id}",
            get(handlers::sessions::get_session).delete(handlers::sessions::end_session),
        )
        .route(
            "/api/v1/sessions/{id}/questions",
            post(handlers::sessions::next_question),
        )
        .route(
            "/api/v1/sessions/{id}/adaptive-questions",
            post(handlers::sessions::adaptive_question),
        )
        .route(
            "/api/v1/sessions/{id}/results",
            post(handlers::sessions::record_result),
        )
}

fn questions_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/questions", get(handlers::questions::list_questions))
        .route(
            "/api/v1/questions/{id}",
            get(handlers::questions::get_question),
        )
}

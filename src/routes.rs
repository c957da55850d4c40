// src/routes.rs

use axum::{
    Json, Router,
    http::Method,
    routing::{delete, get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{batch, questions, search, upload},
    state::AppState,
};

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true}))
}

/// Assembles the main application router.
///
/// * Read endpoints live at the root; mutations under `/api`.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store + config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let api_routes = Router::new()
        .route("/createquestion", post(questions::create_question))
        .route("/editquestions/{id}", patch(questions::edit_question))
        .route("/deletequestion/{id}", delete(questions::delete_question))
        .route("/savebatch", post(batch::save_batch))
        .route("/upload_file", post(upload::upload_file));

    Router::new()
        .route("/health", get(health))
        .route("/getquestion", get(search::get_questions))
        .route("/search", get(search::search_questions))
        .nest("/api", api_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

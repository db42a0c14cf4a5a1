use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod store;

use store::QuestionStore;

/// Build the application router with a fresh question store.
pub fn app() -> Router {
    app_with_store(Arc::new(QuestionStore::new()))
}

/// Build the application router around an existing store.
pub fn app_with_store(store: Arc<QuestionStore>) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Documentation (exempt from response normalization)
        .route("/docs", get(docs))
        // Question CRUD
        .merge(question_routes())
        .with_state(store);

    // Global middleware
    if config::config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::normalize_response))
}

fn question_routes() -> Router<Arc<QuestionStore>> {
    use handlers::questions::{collection, record};

    Router::new()
        // Collection operations
        .route(
            "/api/questions",
            get(collection::question_list).post(collection::question_create),
        )
        // Read-only list endpoint
        .route("/api/questions/json", get(collection::question_list_json))
        // Record operations
        .route(
            "/api/questions/:id",
            get(record::question_get)
                .put(record::question_update)
                .delete(record::question_delete),
        )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "data": {
            "name": "Questions API",
            "version": version,
            "description": "Quiz question CRUD API with normalized error envelopes",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "docs": "/docs (public)",
                "questions": "/api/questions[/:id] (public)",
                "questions_json": "/api/questions/json (public, read-only)",
            }
        }
    }))
}

async fn health(State(store): State<Arc<QuestionStore>>) -> Json<Value> {
    let now = chrono::Utc::now();

    Json(json!({
        "data": {
            "status": "ok",
            "timestamp": now,
            "questions": store.count().await,
        }
    }))
}

/// API documentation. Served verbatim: this path is exempt from the
/// response normalizer, so its payload keeps shapes (non-empty lists,
/// error examples) that would otherwise be rewritten.
async fn docs() -> Json<Value> {
    Json(json!({
        "title": "Questions API",
        "error_envelope": {
            "description": "Error responses are flattened to {status, message, ...}",
            "example": { "status": 400, "message": "This field may not be blank." },
        },
        "paths": {
            "/api/questions": {
                "get": "List all questions",
                "post": "Create a question",
            },
            "/api/questions/json": {
                "get": "Read-only question list",
            },
            "/api/questions/:id": {
                "get": "Fetch a question",
                "put": "Replace a question",
                "delete": "Delete a question",
            },
        },
        "validation_error_examples": [
            { "text": ["This field may not be blank."] },
            { "options": ["Ensure this field has at least 2 elements."] },
            { "non_field_errors": ["Question already exists"] },
        ],
    }))
}

//! Router assembly, grounded in the teacher's `server/routes.rs`
//! (`create_router(state) -> Router`, CORS permissive, `.with_state`).

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::handlers::{admin, documents, events, search, uploads};
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(admin::health))
        .route("/admin/reap", post(admin::reap))
        .route("/uploads", post(uploads::upload_files).get(uploads::list_uploads))
        .route("/uploads/confirm", post(uploads::confirm_upload))
        .route("/uploads/:id", get(uploads::get_upload))
        .route("/documents", get(documents::list_documents))
        .route("/documents/:doc_id", get(documents::get_document))
        .route("/documents/:doc_id/reprocess", post(documents::reprocess_document))
        .route("/search", post(search::search))
        .route("/search/passages", post(search::read_passages))
        .route("/events", get(events::stream))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

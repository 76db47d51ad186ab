use axum::{middleware, response::Json, routing::get, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{fail, greet, health};
use super::middleware::logging_middleware;
use super::openapi::ApiDoc;

pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/greet", get(greet))
        .route("/fail", get(fail))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

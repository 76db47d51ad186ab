use utoipa::OpenApi;

use crate::api::handlers::{Greeting, HealthResponse};
use crate::errors::ApiError;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "API Errors Demo",
        version = "0.1.0",
        description = "Demo service showing the standard JSON error body: {\"error\": <category>, \"message\": <text>, \"paramName\": <field>}."
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::greet,
        crate::api::handlers::fail,
    ),
    components(schemas(ApiError, Greeting, HealthResponse)),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "greet", description = "Endpoints that exercise error responses"),
    )
)]
pub struct ApiDoc;

use anyhow::anyhow;
use axum::{extract::Query, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::errors::{ApiError, ServiceError};

pub const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GreetParams {
    /// Who to greet
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Greeting {
    pub message: String,
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Greet someone by name
#[utoipa::path(
    get,
    path = "/greet",
    tag = "greet",
    params(GreetParams),
    responses(
        (status = 200, description = "Greeting", body = Greeting),
        (status = 400, description = "Invalid name", body = ApiError),
        (status = 418, description = "Refused to greet a teapot", body = ApiError)
    )
)]
pub async fn greet(Query(params): Query<GreetParams>) -> Result<Json<Greeting>, ServiceError> {
    let name = validate_name(params.name.as_deref())?;

    if name.eq_ignore_ascii_case("teapot") {
        return Err(ApiError::new("I'm a teapot")
            .with_category("Teapot")
            .with_status_code(418)
            .into());
    }

    info!("Greeting {}", name);

    Ok(Json(Greeting {
        message: format!("Hello, {name}!"),
    }))
}

/// Always fails with an unclassified error
#[utoipa::path(
    get,
    path = "/fail",
    tag = "greet",
    responses(
        (status = 500, description = "Unclassified failure", body = ApiError)
    )
)]
pub async fn fail() -> Result<Json<Greeting>, ServiceError> {
    Err(anyhow!("greeting template is unavailable").into())
}

fn validate_name(name: Option<&str>) -> Result<&str, ApiError> {
    let name = name.map(str::trim).unwrap_or_default();

    if name.is_empty() {
        return Err(ApiError::validation("name is required").with_param_name("name"));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        ))
        .with_param_name("name"));
    }

    Ok(name)
}

// Prints the demo service's OpenAPI document, including the error schema.
// Usage: cargo run --bin openapi_export > openapi.json

use anyhow::{Context, Result};
use api_errors::api::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI document")?;
    println!("{json}");
    Ok(())
}

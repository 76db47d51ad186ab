use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::codes::{Category, DEFAULT_STATUS, VALIDATION, VALIDATION_STATUS};

/// Structured API error.
///
/// Serializes as `{"error": <category>, "message": <message>, "paramName": <name>}`
/// where `paramName` is only present once set. The status code is carried on
/// the response status line and never appears in the body.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, ToSchema)]
#[error("{message}")]
pub struct ApiError {
    /// Error category, e.g. "Validation"
    #[serde(rename = "error")]
    #[schema(example = "Validation")]
    category: String,
    /// Human-readable error message
    #[schema(example = "name is required")]
    message: String,
    /// HTTP status to respond with
    #[serde(skip, default = "default_status")]
    status_code: u16,
    /// Name of the offending input parameter
    #[serde(rename = "paramName", default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "name")]
    param_name: Option<String>,
}

fn default_status() -> u16 {
    DEFAULT_STATUS
}

impl ApiError {
    /// Create an unclassified error (category "InternalServerError", status 500)
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            category: Category::InternalServerError.into(),
            message: message.into(),
            status_code: Category::InternalServerError.status_code(),
            param_name: None,
        }
    }

    /// Create a validation error (category "Validation", status 400)
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message)
            .with_category(Category::Validation)
            .with_status_code(Category::Validation.status_code())
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.set_category(category);
        self
    }

    /// No range check is done; the caller owns the choice of status.
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.set_status_code(status_code);
        self
    }

    pub fn with_param_name(mut self, name: impl Into<String>) -> Self {
        self.set_param_name(name);
        self
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> &mut Self {
        self.category = category.into();
        self
    }

    pub fn set_status_code(&mut self, status_code: u16) -> &mut Self {
        self.status_code = status_code;
        self
    }

    pub fn set_param_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.param_name = Some(name.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn param_name(&self) -> Option<&str> {
        self.param_name.as_deref()
    }

    /// True when either the status is 400 or the category is "Validation".
    /// Either signal alone is enough.
    pub fn is_validation(&self) -> bool {
        self.status_code == VALIDATION_STATUS || self.category == VALIDATION
    }
}

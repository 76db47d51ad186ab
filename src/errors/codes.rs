use std::fmt;

/// Category assigned to errors that were not explicitly classified
pub const INTERNAL_SERVER_ERROR: &str = "InternalServerError";

/// Category assigned to errors caused by invalid caller input
pub const VALIDATION: &str = "Validation";

/// Status emitted for errors that were not explicitly classified
pub const DEFAULT_STATUS: u16 = 500;

/// Status emitted for validation errors
pub const VALIDATION_STATUS: u16 = 400;

/// Well-known error categories.
///
/// Categories are free-form strings on the wire; this enum only names the
/// two that the crate itself assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Unclassified failure
    InternalServerError,
    /// Invalid caller input
    Validation,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternalServerError => INTERNAL_SERVER_ERROR,
            Self::Validation => VALIDATION,
        }
    }

    /// Get the HTTP status code errors of this category start with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InternalServerError => DEFAULT_STATUS,
            Self::Validation => VALIDATION_STATUS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

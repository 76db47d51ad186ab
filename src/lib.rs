pub mod api;
pub mod config;
pub mod errors;

pub use errors::{
    is_validation_error, write_response, ApiError, Classify, ResponseRecorder, ResponseWriter,
    ServiceError,
};

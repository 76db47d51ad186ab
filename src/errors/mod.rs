//! Structured error values and JSON error responses

pub mod codes;
pub mod response;
pub mod value;

pub use codes::Category;
pub use response::{
    is_validation_error, is_validation_error_opt, write_response, Classify, ErrorResponseLogged,
    ResponseRecorder, ResponseWriter, ServiceError,
};
pub use value::ApiError;

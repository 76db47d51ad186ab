use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::io;
use thiserror::Error;
use tracing::{debug, error, warn, Level};

use super::codes::{DEFAULT_STATUS, INTERNAL_SERVER_ERROR};
use super::value::ApiError;

pub const APPLICATION_JSON: &str = "application/json";

/// Any error a handler can hand to [`write_response`]
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Error that already carries a category and status
    #[error(transparent)]
    Classified(#[from] ApiError),

    /// Anything else; reported as an unclassified 500
    #[error(transparent)]
    Generic(anyhow::Error),
}

/// An `ApiError` boxed directly into `anyhow::Error` stays classified.
/// One wrapped in `.context(..)` does not.
impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(err) => Self::Classified(err),
            Err(err) => Self::Generic(err),
        }
    }
}

impl ServiceError {
    /// Wrap an arbitrary error as a generic one
    pub fn generic<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::from(anyhow::Error::new(err))
    }

    /// Convert into the error value that ends up on the wire.
    ///
    /// Generic errors keep only their top-level message.
    pub fn into_api_error(self) -> ApiError {
        match self {
            Self::Classified(err) => err,
            Self::Generic(err) => ApiError::new(err.to_string()),
        }
    }
}

impl From<&ApiError> for ServiceError {
    fn from(err: &ApiError) -> Self {
        Self::Classified(err.clone())
    }
}

/// Status and category as seen by a response writer
pub trait Classify {
    fn status_code(&self) -> u16;
    fn category(&self) -> &str;
}

impl Classify for ApiError {
    fn status_code(&self) -> u16 {
        ApiError::status_code(self)
    }

    fn category(&self) -> &str {
        ApiError::category(self)
    }
}

impl Classify for ServiceError {
    fn status_code(&self) -> u16 {
        match self {
            Self::Classified(err) => err.status_code(),
            Self::Generic(_) => DEFAULT_STATUS,
        }
    }

    fn category(&self) -> &str {
        match self {
            Self::Classified(err) => err.category(),
            Self::Generic(_) => INTERNAL_SERVER_ERROR,
        }
    }
}

/// Returns true only for classified errors whose status is 400 or whose
/// category is "Validation".
pub fn is_validation_error(err: &ServiceError) -> bool {
    match err {
        ServiceError::Classified(err) => err.is_validation(),
        ServiceError::Generic(_) => false,
    }
}

/// Same as [`is_validation_error`], treating a missing error as not validation
pub fn is_validation_error_opt(err: Option<&ServiceError>) -> bool {
    err.is_some_and(is_validation_error)
}

/// Writable HTTP response target
pub trait ResponseWriter {
    fn set_header(&mut self, name: &str, value: &str);

    fn write_status(&mut self, status_code: u16);

    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Write `err` as a JSON error response.
///
/// Sets `Content-Type: application/json`, writes the status, then the body.
/// Errors that are not already classified go out as a 500
/// "InternalServerError" carrying their message. Failures of the
/// underlying writer are dropped.
pub fn write_response<W>(w: &mut W, err: impl Into<ServiceError>)
where
    W: ResponseWriter + ?Sized,
{
    let err = err.into().into_api_error();
    log_error_response(&err);

    w.set_header(header::CONTENT_TYPE.as_str(), APPLICATION_JSON);
    w.write_status(err.status_code());

    let mut body = match serde_json::to_vec(&err) {
        Ok(body) => body,
        Err(_) => return,
    };
    body.push(b'\n');

    let _ = w.write_body(&body);
}

/// Marker extension on axum responses built from a [`ServiceError`].
/// The error was already logged when it was written.
#[derive(Debug, Clone, Copy)]
pub struct ErrorResponseLogged;

fn error_log_level(status_code: u16) -> Level {
    match status_code {
        500.. => Level::ERROR,
        400..=499 => Level::WARN,
        _ => Level::DEBUG,
    }
}

fn log_error_response(err: &ApiError) {
    let level = error_log_level(err.status_code());

    if level == Level::ERROR {
        error!(
            status = err.status_code(),
            category = %err.category(),
            param_name = ?err.param_name(),
            "Responding with server error: {}",
            err.message()
        );
    } else if level == Level::WARN {
        warn!(
            status = err.status_code(),
            category = %err.category(),
            param_name = ?err.param_name(),
            "Responding with client error: {}",
            err.message()
        );
    } else {
        debug!(
            status = err.status_code(),
            category = %err.category(),
            param_name = ?err.param_name(),
            "Responding with error body: {}",
            err.message()
        );
    }
}

/// Writing into an axum response replaces its body.
/// Statuses axum cannot represent become 500.
impl ResponseWriter for Response {
    fn set_header(&mut self, name: &str, value: &str) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers_mut().insert(name, value);
        }
    }

    fn write_status(&mut self, status_code: u16) {
        *self.status_mut() =
            StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        *self.body_mut() = Body::from(bytes.to_vec());
        Ok(())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::empty());
        write_response(&mut response, self);
        response.extensions_mut().insert(ErrorResponseLogged);
        response
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ServiceError::from(self).into_response()
    }
}

/// In-memory [`ResponseWriter`] that records what was written.
///
/// Only the first status write counts; writing a body before any status
/// implies 200.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    status: Option<u16>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    /// Header lookup is case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

impl ResponseWriter for ResponseRecorder {
    fn set_header(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    fn write_status(&mut self, status_code: u16) {
        if self.status.is_none() {
            self.status = Some(status_code);
        }
    }

    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.status.get_or_insert(200);
        self.body.extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::codes::{VALIDATION, VALIDATION_STATUS};
    use anyhow::anyhow;

    struct BrokenPipe {
        status: Option<u16>,
    }

    impl ResponseWriter for BrokenPipe {
        fn set_header(&mut self, _name: &str, _value: &str) {}

        fn write_status(&mut self, status_code: u16) {
            self.status = Some(status_code);
        }

        fn write_body(&mut self, _bytes: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection closed"))
        }
    }

    #[test]
    fn test_write_response_classified() {
        let err = ApiError::new("Oops")
            .with_category("Error")
            .with_param_name("Name")
            .with_status_code(400);
        let mut rec = ResponseRecorder::new();

        write_response(&mut rec, err);

        assert_eq!(rec.status(), 400);
        assert_eq!(rec.header("Content-Type"), Some("application/json"));

        let body = rec.body_json().unwrap();
        assert_eq!(body["error"], "Error");
        assert_eq!(body["message"], "Oops");
        assert_eq!(body["paramName"], "Name");
    }

    #[test]
    fn test_write_response_generic() {
        let mut rec = ResponseRecorder::new();

        write_response(&mut rec, anyhow!("boom"));

        assert_eq!(rec.status(), 500);
        assert_eq!(rec.header("content-type"), Some(APPLICATION_JSON));

        let body = rec.body_json().unwrap();
        assert_eq!(body["error"], "InternalServerError");
        assert_eq!(body["message"], "boom");
        assert!(body.get("paramName").is_none());
    }

    #[test]
    fn test_write_response_std_error() {
        let parse_err = "abc".parse::<u32>().unwrap_err();
        let expected = parse_err.to_string();
        let mut rec = ResponseRecorder::new();

        write_response(&mut rec, ServiceError::generic(parse_err));

        assert_eq!(rec.status(), 500);
        assert_eq!(rec.body_json().unwrap()["message"], expected.as_str());
    }

    #[test]
    fn test_write_response_body_ends_with_newline() {
        let mut rec = ResponseRecorder::new();
        write_response(&mut rec, ApiError::validation("bad"));
        assert_eq!(
            rec.body(),
            b"{\"error\":\"Validation\",\"message\":\"bad\"}\n".as_slice()
        );
    }

    #[test]
    fn test_write_response_shared_error_by_reference() {
        let sentinel = ApiError::validation("limit out of range").with_param_name("limit");

        for _ in 0..2 {
            let mut rec = ResponseRecorder::new();
            write_response(&mut rec, &sentinel);
            assert_eq!(rec.status(), 400);
            assert_eq!(rec.body_json().unwrap()["paramName"], "limit");
        }
    }

    #[test]
    fn test_write_response_swallows_write_failure() {
        let mut pipe = BrokenPipe { status: None };
        write_response(&mut pipe, ApiError::new("gone"));
        assert_eq!(pipe.status, Some(500));
    }

    #[test]
    fn test_is_validation_error() {
        assert!(is_validation_error(&ApiError::validation("e").into()));
        assert!(is_validation_error(
            &ApiError::new("e").with_category("Validation").into()
        ));
        assert!(is_validation_error(
            &ApiError::new("e").with_status_code(400).into()
        ));
        assert!(!is_validation_error(
            &ApiError::new("e").with_status_code(500).into()
        ));
        assert!(!is_validation_error(&anyhow!("Validation").into()));
    }

    #[test]
    fn test_is_validation_error_opt() {
        let err: ServiceError = ApiError::validation("e").into();
        assert!(is_validation_error_opt(Some(&err)));
        assert!(!is_validation_error_opt(None));
    }

    #[test]
    fn test_classify_generic_defaults() {
        let err: ServiceError = anyhow!("boom").into();
        assert_eq!(Classify::status_code(&err), 500);
        assert_eq!(Classify::category(&err), "InternalServerError");

        let err: ServiceError = ApiError::new("x").with_category("Teapot").with_status_code(418).into();
        assert_eq!(Classify::status_code(&err), 418);
        assert_eq!(Classify::category(&err), "Teapot");
    }

    fn load_widget() -> anyhow::Result<()> {
        Err(ApiError::validation("bad id").with_param_name("id").into())
    }

    #[test]
    fn test_api_error_inside_anyhow_stays_classified() {
        let err: ServiceError = load_widget().unwrap_err().into();
        assert!(matches!(err, ServiceError::Classified(_)));
        assert!(is_validation_error(&err));

        let mut rec = ResponseRecorder::new();
        write_response(&mut rec, load_widget().unwrap_err());

        assert_eq!(rec.status(), 400);
        assert_eq!(
            rec.body_json().unwrap(),
            serde_json::json!({"error": "Validation", "message": "bad id", "paramName": "id"})
        );
    }

    #[test]
    fn test_api_error_under_context_is_generic() {
        use anyhow::Context;

        let err: ServiceError = load_widget()
            .context("loading widget")
            .unwrap_err()
            .into();
        assert!(matches!(err, ServiceError::Generic(_)));
        assert!(!is_validation_error(&err));

        let mut rec = ResponseRecorder::new();
        write_response(&mut rec, err);
        assert_eq!(rec.status(), 500);
        assert_eq!(rec.body_json().unwrap()["message"], "loading widget");
    }

    #[test]
    fn test_error_log_level_by_status() {
        assert_eq!(error_log_level(500), Level::ERROR);
        assert_eq!(error_log_level(503), Level::ERROR);
        assert_eq!(error_log_level(400), Level::WARN);
        assert_eq!(error_log_level(418), Level::WARN);
        assert_eq!(error_log_level(499), Level::WARN);
        assert_eq!(error_log_level(200), Level::DEBUG);
        assert_eq!(error_log_level(302), Level::DEBUG);
        assert_eq!(error_log_level(42), Level::DEBUG);
    }

    #[test]
    fn test_into_response_marks_error_as_logged() {
        let response = ApiError::validation("bad").into_response();
        assert!(response.extensions().get::<ErrorResponseLogged>().is_some());
    }

    #[test]
    fn test_recorder_first_status_wins() {
        let mut rec = ResponseRecorder::new();
        rec.write_status(404);
        rec.write_status(500);
        assert_eq!(rec.status(), 404);

        let mut rec = ResponseRecorder::new();
        rec.write_body(b"ok").unwrap();
        rec.write_status(500);
        assert_eq!(rec.status(), 200);
    }

    #[test]
    fn test_into_response_status_validation() {
        let response = ApiError::validation("Invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            APPLICATION_JSON
        );
    }

    #[test]
    fn test_into_response_status_custom() {
        let response = ApiError::new("short and stout")
            .with_category("Teapot")
            .with_status_code(418)
            .into_response();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn test_into_response_status_generic() {
        let response = ServiceError::from(anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_unrepresentable_status_falls_back() {
        let response = ApiError::new("odd").with_status_code(42).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_category_constants_match_classification() {
        let err = ApiError::new("e").with_category(VALIDATION);
        assert!(err.is_validation());
        let err = ApiError::new("e").with_status_code(VALIDATION_STATUS);
        assert!(err.is_validation());
    }
}

//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use crate::Error;

/// Methods every handler advertises for CORS.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn error(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: None,
            error: Some(message.into()),
        }
    }
}

fn builder(status: u16) -> lambda_http::http::response::Builder {
    Response::builder()
        .status(status)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .header("Access-Control-Allow-Headers", ALLOWED_HEADERS)
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Body>, lambda_http::Error> {
    Ok(builder(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))?)
}

/// Wrap `data` in a successful [`ApiResponse`].
pub fn ok<T: Serialize>(status: u16, data: T) -> Result<Response<Body>, lambda_http::Error> {
    json_response(status, &ApiResponse::success(data))
}

/// Wrap `data` in a successful [`ApiResponse`] carrying a message.
pub fn ok_with_message<T: Serialize>(
    status: u16,
    data: T,
    message: &str,
) -> Result<Response<Body>, lambda_http::Error> {
    json_response(status, &ApiResponse::success(data).with_message(message))
}

/// Create an error response with the given status code and message.
pub fn error_response(status: u16, message: impl Into<String>) -> Result<Response<Body>, lambda_http::Error> {
    json_response(status, &ApiResponse::<()>::error(message))
}

/// Map a library error to its JSON response, logging server-side failures.
pub fn from_error(err: &Error) -> Result<Response<Body>, lambda_http::Error> {
    let status = err.status_code();
    if status >= 500 {
        error!(error = %err, "Request failed");
        error_response(status, "Internal server error")
    } else {
        warn!(status, error = %err, "Request rejected");
        error_response(status, err.to_string())
    }
}

/// Turn a library result into a success envelope or the mapped error response.
pub fn respond<T: Serialize>(
    result: crate::Result<T>,
    status: u16,
    message: Option<&str>,
) -> Result<Response<Body>, lambda_http::Error> {
    match (result, message) {
        (Ok(data), Some(message)) => ok_with_message(status, data, message),
        (Ok(data), None) => ok(status, data),
        (Err(e), _) => from_error(&e),
    }
}

/// Answer a CORS preflight request.
pub fn preflight() -> Result<Response<Body>, lambda_http::Error> {
    Ok(builder(200).body(Body::from("ok"))?)
}

/// Parse request body as JSON, returning a 400 response on failure.
///
/// Returns `Ok(Ok(T))` on successful parse, `Ok(Err(Response))` on parse error (400),
/// or `Err(lambda_http::Error)` on serialization failure.
pub fn parse_json_body<T: DeserializeOwned>(body: &Body) -> Result<Result<T, Response<Body>>, lambda_http::Error> {
    match serde_json::from_slice(body.as_ref()) {
        Ok(parsed) => Ok(Ok(parsed)),
        Err(e) => {
            let response = error_response(400, format!("Invalid request body: {}", e))?;
            Ok(Err(response))
        }
    }
}

/// Non-empty path segments, with an API Gateway stage prefix already removed.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Parse a query-string value, treating absent and malformed values alike.
pub fn parse_param<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Macro to parse request body, returning early with 400 on parse error.
///
/// Usage:
/// ```ignore
/// let request: MyRequest = parse_body!(event.body());
/// ```
#[macro_export]
macro_rules! parse_body {
    ($body:expr) => {
        match shared::http::parse_json_body($body)? {
            Ok(parsed) => parsed,
            Err(response) => return Ok(response),
        }
    };
}

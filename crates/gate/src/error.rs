//! Gate error → (status line, body) single conversion point.
//!
//! Mirrors the teacher's `map_docker_error` pattern: callers match on one
//! typed error instead of threading raw status codes through every call
//! site.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("cannot parse request line")]
    BadRequest,
    #[error("missing or invalid X-API-Key")]
    Unauthorized,
    #[error("no route")]
    NotFound,
    #[error("image not set")]
    MissingImage,
    #[error("backend not healthy")]
    Unhealthy,
    #[error("backend dial failed: {0}")]
    BadGateway(String),
}

impl GateError {
    /// The HTTP status line (without the leading `HTTP/1.1 `).
    pub fn status_line(&self) -> &'static str {
        match self {
            GateError::BadRequest => "400 Bad Request",
            GateError::Unauthorized => "401 Unauthorized",
            GateError::NotFound => "404 Not Found",
            GateError::MissingImage => "500 Internal Server Error",
            GateError::Unhealthy => "503 Service Unavailable",
            GateError::BadGateway(_) => "502 Bad Gateway",
        }
    }

    /// The plain-text body sent alongside the status line.
    pub fn body(&self) -> String {
        self.to_string()
    }
}

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use serde_json::Value;

/// Failures raised by the calendar store and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum CalendarError {
    #[error("schedule provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("cached calendar unreadable: {0}")]
    CacheCorrupt(String),

    #[error("{0}")]
    NotFound(String),

    #[error("malformed schedule record: {0}")]
    MalformedRecord(String),
}

#[derive(Debug)]
pub struct Error {
    pub code: StatusCode,
    pub body: Json<Value>,
}

impl Error {
    pub fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            body: Json(json!({"error": message})),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.code, self.body).into_response()
    }
}

impl From<CalendarError> for Error {
    fn from(error: CalendarError) -> Self {
        let code = match error {
            CalendarError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(code, &error.to_string())
    }
}

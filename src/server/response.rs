use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::Error;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            data: None,
            error: Some(message.into()),
        }
    }
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "data": null, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::BadRequest(msg) => ApiError::bad_request(msg),
            Error::PastDate | Error::SlotBlocked(_) | Error::InvalidTokenFormat => {
                ApiError::bad_request(err.to_string())
            }
            Error::NotFound(entity) => ApiError::not_found(capitalize(&format!("{entity} not found"))),
            Error::Unauthorized | Error::TokenExpired => ApiError::unauthorized(err.to_string()),
            Error::Forbidden(msg) => ApiError::forbidden(msg),
            Error::AlreadyBooked | Error::AlreadyExists(_) | Error::Conflict(_) => {
                ApiError::conflict(err.to_string())
            }
            other => {
                tracing::error!("Request failed: {other}");
                ApiError::internal("Internal server error")
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Extension for Option types from store operations.
pub trait StoreOptionExt<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreOptionExt<T> for Option<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (Error::PastDate, StatusCode::BAD_REQUEST),
            (Error::SlotBlocked("blocked".into()), StatusCode::BAD_REQUEST),
            (Error::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (Error::NotFound("slot"), StatusCode::NOT_FOUND),
            (Error::Unauthorized, StatusCode::UNAUTHORIZED),
            (Error::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (Error::AlreadyBooked, StatusCode::CONFLICT),
            (Error::AlreadyExists("x".into()), StatusCode::CONFLICT),
            (Error::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::from(Error::NotFound("lab")).message, "Lab not found");
        assert_eq!(
            ApiError::from(Error::AlreadyBooked).message,
            "slot already booked for that date"
        );
        let internal = ApiError::from(Error::Io(std::io::Error::other("disk on fire")));
        assert_eq!(internal.message, "Internal server error");
    }
}

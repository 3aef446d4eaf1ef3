//! Errors returned to HTTP clients.
//!
//! Every failure a handler can report maps to one [`ApiError`] variant, and
//! each variant carries the message sent to the client in the
//! `{"error": {"code", "message"}}` body.

use http::StatusCode;
use jrender_forms::RenderError;
use serde::Serialize;

use crate::http::Response;

/// Client-facing error with an HTTP status.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
	#[error("{0}")]
	BadRequest(String),

	#[error("{0}")]
	NotFound(String),

	#[error("{0}")]
	TooManyRequests(String),

	#[error("{0}")]
	InternalServerError(String),
}

impl ApiError {
	pub fn bad_request(message: impl Into<String>) -> Self {
		Self::BadRequest(message.into())
	}

	pub fn not_found(message: impl Into<String>) -> Self {
		Self::NotFound(message.into())
	}

	pub fn too_many_requests(message: impl Into<String>) -> Self {
		Self::TooManyRequests(message.into())
	}

	pub fn internal(message: impl Into<String>) -> Self {
		Self::InternalServerError(message.into())
	}

	/// HTTP status of this error.
	///
	/// # Examples
	///
	/// ```
	/// use jrender_server::ApiError;
	/// use http::StatusCode;
	///
	/// assert_eq!(ApiError::not_found("form not found").code(), StatusCode::NOT_FOUND);
	/// assert_eq!(ApiError::too_many_requests("quota").code(), StatusCode::TOO_MANY_REQUESTS);
	/// ```
	pub fn code(&self) -> StatusCode {
		match self {
			Self::BadRequest(_) => StatusCode::BAD_REQUEST,
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
			Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn message(&self) -> &str {
		match self {
			Self::BadRequest(message)
			| Self::NotFound(message)
			| Self::TooManyRequests(message)
			| Self::InternalServerError(message) => message,
		}
	}

	/// JSON error response for this error.
	pub fn to_response(&self) -> Response {
		let body = ErrorBody {
			error: ErrorDetail {
				code: self.code().as_u16(),
				message: self.message().to_string(),
			},
		};
		match Response::new(self.code()).with_json(&body) {
			Ok(response) => response,
			Err(_) => Response::new(self.code()),
		}
	}
}

impl From<RenderError> for ApiError {
	fn from(err: RenderError) -> Self {
		tracing::error!(error = %err, "form rendering failed");
		Self::internal("failed to render form")
	}
}

/// Wire shape of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ErrorBody {
	pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ErrorDetail {
	#[serde(default)]
	pub code: u16,
	#[serde(default)]
	pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

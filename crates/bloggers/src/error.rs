//! Backend error payloads and their user-facing text.

use picklist_select::FetchError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback text for errors without a recognised code.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong!";

/// Machine-readable error code attached to a backend error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	RefreshTokenNotFound,
	UserNotFound,
	BloggerNotFound,
	CategoryNotFound,
	NameIsRequired,
	NoTokenProvided,
	RefreshTokenExpired,
	InvalidCredentials,
	DataShouldBeMultiple,
	UserAlreadyExists,
	BloggerAlreadyExists,
	CategoryAlreadyExists,
	AccessDenied,
}

impl ErrorCode {
	/// User-facing text for this code.
	pub fn message(self) -> &'static str {
		match self {
			Self::RefreshTokenNotFound => "Refresh token not found.",
			Self::UserNotFound => "User not found.",
			Self::BloggerNotFound => "Blogger not found.",
			Self::CategoryNotFound => "Category not found.",
			Self::NameIsRequired => "Name is required.",
			Self::NoTokenProvided => "No token provided",
			Self::RefreshTokenExpired => "Refresh token has expired.",
			Self::InvalidCredentials => "Credentials are invalid.",
			Self::DataShouldBeMultiple => "You should send multiple data",
			Self::UserAlreadyExists => "User already exists.",
			Self::BloggerAlreadyExists => "Blogger already exists.",
			Self::CategoryAlreadyExists => "Category already exists.",
			Self::AccessDenied => "Access denied.",
		}
	}

	/// HTTP-like status a backend answers with for this code.
	pub fn status(self) -> u16 {
		match self {
			Self::RefreshTokenNotFound | Self::UserNotFound | Self::BloggerNotFound | Self::CategoryNotFound => 404,
			Self::NoTokenProvided | Self::RefreshTokenExpired | Self::InvalidCredentials => 401,
			Self::AccessDenied => 403,
			Self::UserAlreadyExists | Self::BloggerAlreadyExists | Self::CategoryAlreadyExists => 409,
			Self::NameIsRequired | Self::DataShouldBeMultiple => 400,
		}
	}
}

/// Error body returned by the blogger backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{}", error_message(self))]
pub struct ApiError {
	#[serde(default)]
	pub message: Option<String>,
	#[serde(default)]
	pub error_code: Option<ErrorCode>,
}

impl ApiError {
	pub fn new(code: ErrorCode) -> Self {
		Self {
			message: None,
			error_code: Some(code),
		}
	}

	pub fn with_message(message: impl Into<String>) -> Self {
		Self {
			message: Some(message.into()),
			error_code: None,
		}
	}
}

/// Text to show the user for `error`.
///
/// A known code wins over the backend message. Without a code the backend
/// message is used, and without either the generic fallback.
pub fn error_message(error: &ApiError) -> String {
	match (error.error_code, error.message.as_deref()) {
		(Some(code), _) => code.message().to_string(),
		(None, Some(message)) if !message.is_empty() => message.to_string(),
		(None, _) => GENERIC_ERROR_MESSAGE.to_string(),
	}
}

impl From<ApiError> for FetchError {
	fn from(error: ApiError) -> Self {
		FetchError::Status {
			code: error.error_code.map_or(500, ErrorCode::status),
			message: error_message(&error),
		}
	}
}

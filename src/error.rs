use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::store;

/// Error type for the application.
///
/// The Display trait is not sent to the client for server errors,
/// so it can show sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("password hashing error: {0}")]
	Hash(#[from] argon2::password_hash::Error),
	#[error("background task failed: {0}")]
	Join(#[from] tokio::task::JoinError),
	#[error(transparent)]
	Store(#[from] store::Error),
	#[error("not found")]
	NotFound,
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
	pub error: String,
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Path(..) | Self::Query(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::Store(store::Error::UnknownUser(..) | store::Error::UnknownPost(..)) => {
				StatusCode::BAD_REQUEST
			}
			Self::Store(store::Error::UserExists(..)) => StatusCode::CONFLICT,
			Self::Store(..) | Self::Hash(..) | Self::Join(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::NotFound => StatusCode::NOT_FOUND,
		}
	}

	/// The message presented to the client.
	fn message(&self) -> String {
		match self {
			Self::Validation(errors) => {
				let mut messages = errors
					.field_errors()
					.into_iter()
					.flat_map(|(field, errors)| {
						errors
							.iter()
							.map(move |error| format!("{field}: {error}"))
					})
					.collect::<Vec<_>>();

				// field order is not stable
				messages.sort();
				messages.join(", ")
			}
			Self::Json(rejection) => rejection.body_text(),
			Self::Path(rejection) => rejection.body_text(),
			Self::Query(rejection) => rejection.body_text(),
			Self::Store(
				error @ (store::Error::UnknownUser(..)
				| store::Error::UnknownPost(..)
				| store::Error::UserExists(..)),
			) => error.to_string(),
			Self::Store(..) | Self::Hash(..) | Self::Join(..) => "internal server error".into(),
			Self::NotFound => self.to_string(),
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		} else {
			tracing::debug!(error = %self, "request rejected");
		}

		(
			status,
			Json(ErrorResponse {
				error: self.message(),
			}),
		)
			.into_response()
	}
}

impl OperationOutput for Error {
	type Inner = ErrorResponse;
}

//! Gateway error types.

use casemap_primitives::ElementId;
use thiserror::Error;

/// Failures reported by a [`crate::Gateway`].
#[derive(Debug, Error)]
pub enum GatewayError {
	/// The request never produced a response (connection refused, timeout, ...).
	#[error("transport failure: {0}")]
	Transport(String),

	/// The server answered with a validation or authorization failure.
	#[error("rejected by server ({status}): {message}")]
	Rejected {
		/// HTTP-like status code.
		status: u16,
		/// Server-provided reason.
		message: String,
	},

	/// The referenced element does not exist on the server.
	#[error("element {0} not found")]
	NotFound(ElementId),

	/// The response body could not be decoded.
	#[error("malformed response: {0}")]
	Decode(#[from] serde_json::Error),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

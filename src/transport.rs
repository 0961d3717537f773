//! Refresh transport contract and the built-in HTTP implementation.

#[cfg(feature = "reqwest")] pub mod http;
#[cfg(feature = "reqwest")] pub use http::HttpRefreshTransport;

// self
use crate::{_prelude::*, session::TokenPair};

/// Boxed future returned by [`RefreshTransport`] implementations.
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Network collaborator that exchanges a refresh token for a new token pair.
pub trait RefreshTransport
where
	Self: Send + Sync,
{
	/// Performs the refresh call.
	///
	/// Implementations own their timeout and retry policy; whatever error finally surfaces here
	/// ends the session, so retry-on-transient-failure belongs inside the transport, never in
	/// the coordinator.
	fn refresh<'a>(&'a self, refresh_token: &'a str) -> TransportFuture<'a, TokenPair>;
}

/// Error type produced by [`RefreshTransport`] implementations.
///
/// Variants carry rendered strings instead of source errors so a single failed cycle can hand
/// every queued waiter an identical clone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TransportError {
	/// Refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the request with status {status}: {message}.")]
	Endpoint {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Response body or reason phrase summarizing the rejection.
		message: String,
	},
	/// Underlying HTTP client reported a connection-level failure.
	#[error("Network error occurred while calling the refresh endpoint: {message}.")]
	Network {
		/// Human-readable transport failure payload.
		message: String,
	},
	/// Endpoint answered with a success status but the body was not a valid token pair.
	#[error("Refresh endpoint returned a malformed token payload: {message}.")]
	ResponseParse {
		/// Parse failure rendered as text, including the failing JSON path.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoint_error_renders_status_and_body() {
		let error = TransportError::Endpoint { status: 401, message: "invalid_grant".into() };

		assert_eq!(
			error.to_string(),
			"Refresh endpoint rejected the request with status 401: invalid_grant.",
		);
	}

	#[test]
	fn transport_errors_round_trip_through_serde() {
		let error = TransportError::Network { message: "dns failure".into() };
		let payload =
			serde_json::to_string(&error).expect("Transport error should serialize to JSON.");
		let round_trip: TransportError = serde_json::from_str(&payload)
			.expect("Serialized transport error should deserialize from JSON.");

		assert_eq!(round_trip, error);
	}
}

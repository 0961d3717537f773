//! Error taxonomy surfaced by the refresh coordinator.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical coordinator error exposed by public APIs.
///
/// Every variant is cheap to clone because one refresh cycle fans its outcome out to the
/// initiating caller and every queued waiter. Malformed tokens never surface here; the decoder
/// absorbs them and reports `None` instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum Error {
	/// No refresh token is stored, so no network refresh can be attempted.
	#[error("No refresh token is available for this session.")]
	NoRefreshToken,
	/// The refresh transport call failed; the session has already been cleared.
	#[error("{0}")]
	Transport(
		#[from]
		#[source]
		crate::transport::TransportError,
	),
	/// The refresh cycle was abandoned before it settled, either by an administrative reset or
	/// by an out-of-band logout observed during the in-flight call.
	#[error("Refresh cycle was abandoned before it settled.")]
	Interrupted,
}

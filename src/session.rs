//! Session bridge contract, token pair data model, and the built-in in-memory backend.

pub mod memory;

pub use memory::MemorySession;

// self
use crate::_prelude::*;

/// Redacted credential wrapper keeping token material out of logs and debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a raw credential string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner credential. Callers must keep this string out of logs.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Access/refresh token pair held by the session bridge.
///
/// A successful refresh replaces the whole pair atomically; the coordinator never merges fields
/// of an old pair into a new one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Short-lived credential attached to outgoing API requests.
	pub access_token: TokenSecret,
	/// Longer-lived credential used solely to obtain a new access token.
	pub refresh_token: TokenSecret,
	/// Token scheme reported by the issuer, usually `bearer`.
	pub token_type: String,
	/// Relative access token lifetime in seconds, as reported by the issuer.
	pub expires_in: i64,
}
impl TokenPair {
	/// Builds a pair from raw credential strings.
	pub fn new(
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
		token_type: impl Into<String>,
		expires_in: i64,
	) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
			token_type: token_type.into(),
			expires_in,
		}
	}
}

/// Storage contract for the current session's token pair and authentication flag.
///
/// The coordinator is the only writer during a refresh cycle, but other parts of the
/// application (login, explicit logout) may write out-of-band at any time; implementations
/// therefore guard their own interior state and hand out owned snapshots.
pub trait SessionBridge
where
	Self: Send + Sync,
{
	/// Returns the currently stored pair, if a session exists.
	fn tokens(&self) -> Option<TokenPair>;

	/// Replaces the stored pair wholesale.
	fn set_tokens(&self, pair: TokenPair);

	/// Removes the stored pair without touching the authentication flag.
	fn clear_tokens(&self);

	/// Marks the broader application session unauthenticated, independent of token storage.
	fn logout(&self);
}

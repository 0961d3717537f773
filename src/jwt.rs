//! Advisory compact-token decoding and buffered expiry evaluation.
//!
//! The decoder inspects the claims segment only and performs no signature verification; the
//! issuing server remains the trust boundary. Its output drives local scheduling decisions
//! (when to refresh), nothing else, which is why every failure path degrades to `None` or
//! "treat as expired" instead of an error.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

/// Default safety margin applied when evaluating token expiry.
///
/// A token is renewed proactively once it enters this window so a multi-step request sequence
/// never starts with a credential that dies mid-flight.
pub const DEFAULT_EXPIRY_BUFFER: Duration = Duration::seconds(300);

/// Claims extracted from a compact token's payload segment.
///
/// Recomputed on demand from the raw token string and never cached; re-decoding is cheap and
/// a cache would only invite staleness bugs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedPayload {
	/// Subject identifier of the token holder.
	#[serde(rename = "sub")]
	pub subject: String,
	/// Email claim; empty when the issuer omits it.
	#[serde(default)]
	pub email: String,
	/// Expiry instant in epoch seconds.
	#[serde(rename = "exp")]
	pub expires_at: i64,
	/// Issuer claim; empty when the issuer omits it.
	#[serde(rename = "iss", default)]
	pub issuer: String,
}

/// Decodes the claims segment of a compact token without verifying its signature.
///
/// Accepts any string; returns `None` unless the input consists of exactly three dot-separated
/// segments whose middle segment is unpadded base64url-encoded JSON carrying at least `sub` and
/// `exp`. Never panics, so callers need no recovery path for adversarial input.
pub fn decode_jwt_payload(token: &str) -> Option<DecodedPayload> {
	let mut segments = token.split('.');
	let claims = match (segments.next(), segments.next(), segments.next(), segments.next()) {
		(Some(_header), Some(claims), Some(_signature), None) => claims,
		_ => return None,
	};
	let bytes = URL_SAFE_NO_PAD.decode(claims).ok()?;

	serde_json::from_slice(&bytes).ok()
}

/// Evaluates token expiry with the default 300-second buffer.
pub fn is_token_expired(token: &str) -> bool {
	is_token_expired_with(token, DEFAULT_EXPIRY_BUFFER)
}

/// Evaluates token expiry with a caller-provided buffer against the current clock.
pub fn is_token_expired_with(token: &str, buffer: Duration) -> bool {
	is_token_expired_at(token, buffer, OffsetDateTime::now_utc())
}

/// Evaluates token expiry at an explicit instant, so tests control the clock.
///
/// An undecodable token counts as expired: forcing a refresh or re-auth beats issuing a request
/// with a credential nobody can read.
pub fn is_token_expired_at(token: &str, buffer: Duration, instant: OffsetDateTime) -> bool {
	let Some(payload) = decode_jwt_payload(token) else {
		return true;
	};

	instant.unix_timestamp() + buffer.whole_seconds() >= payload.expires_at
}

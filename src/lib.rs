//! Single-flight token refresh coordination: keep a client continuously supplied with a valid
//! short-lived access token while concurrent refresh demand collapses into one network call.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod coordinator;
pub mod error;
pub mod jwt;
pub mod obs;
pub mod session;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience fixtures for coordinator tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		sync::atomic::{AtomicU64, Ordering},
	};
	// crates.io
	use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
	// self
	use crate::{
		coordinator::RefreshCoordinator,
		jwt::DecodedPayload,
		session::{MemorySession, SessionBridge, TokenPair},
		transport::{RefreshTransport, TransportError, TransportFuture},
	};

	/// Builds a token pair fixture with a bearer type and a 30-minute relative lifetime.
	pub fn test_token_pair(access: &str, refresh: &str) -> TokenPair {
		TokenPair::new(access, refresh, "bearer", 1_800)
	}

	/// Encodes an unsigned compact token whose claims segment carries the provided payload.
	///
	/// The signature segment is a placeholder; the decoder never inspects it.
	pub fn encode_unsigned_jwt(payload: &DecodedPayload) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
		let claims = URL_SAFE_NO_PAD
			.encode(serde_json::to_vec(payload).expect("Claims fixture should serialize to JSON."));

		format!("{header}.{claims}.unsigned")
	}

	/// Constructs a coordinator wired to the provided recording session and scripted transport.
	pub fn build_test_coordinator(
		session: Arc<RecordingSession>,
		transport: Arc<ScriptedTransport>,
	) -> RefreshCoordinator {
		RefreshCoordinator::new(session, transport)
	}

	/// Scripted [`RefreshTransport`] that serves queued outcomes and records invocations.
	#[derive(Debug, Default)]
	pub struct ScriptedTransport {
		calls: AtomicU64,
		gate: Mutex<Option<oneshot::Receiver<()>>>,
		requests: Mutex<Vec<String>>,
		script: Mutex<VecDeque<Result<TokenPair, TransportError>>>,
	}
	impl ScriptedTransport {
		/// Creates a transport with an empty script.
		pub fn new() -> Self {
			Self::default()
		}

		/// Queues a successful refresh outcome.
		pub fn push_success(&self, pair: TokenPair) {
			self.script.lock().push_back(Ok(pair));
		}

		/// Queues a failed refresh outcome.
		pub fn push_failure(&self, error: TransportError) {
			self.script.lock().push_back(Err(error));
		}

		/// Holds the next response until the returned sender fires or is dropped.
		pub fn hold_next_response(&self) -> oneshot::Sender<()> {
			let (tx, rx) = oneshot::channel();

			*self.gate.lock() = Some(rx);

			tx
		}

		/// Returns how many times the coordinator invoked this transport.
		pub fn calls(&self) -> u64 {
			self.calls.load(Ordering::SeqCst)
		}

		/// Returns every refresh token handed to this transport, in call order.
		pub fn requested_tokens(&self) -> Vec<String> {
			self.requests.lock().clone()
		}
	}
	impl RefreshTransport for ScriptedTransport {
		fn refresh<'a>(&'a self, refresh_token: &'a str) -> TransportFuture<'a, TokenPair> {
			Box::pin(async move {
				self.calls.fetch_add(1, Ordering::SeqCst);
				self.requests.lock().push(refresh_token.to_string());

				let gate = self.gate.lock().take();

				if let Some(gate) = gate {
					let _ = gate.await;
				}

				self.script
					.lock()
					.pop_front()
					.expect("Scripted transport ran out of queued outcomes.")
			})
		}
	}

	/// [`SessionBridge`] decorator that counts `clear_tokens`/`logout` invocations.
	#[derive(Debug, Default)]
	pub struct RecordingSession {
		clear_calls: AtomicU64,
		inner: MemorySession,
		logout_calls: AtomicU64,
	}
	impl RecordingSession {
		/// Creates an empty, unauthenticated session.
		pub fn new() -> Self {
			Self::default()
		}

		/// Creates a session already signed in with the provided pair.
		pub fn signed_in(pair: TokenPair) -> Self {
			let session = Self::default();

			session.inner.sign_in(pair);

			session
		}

		/// Returns the wrapped in-memory session for direct inspection.
		pub fn session(&self) -> &MemorySession {
			&self.inner
		}

		/// Returns how many times `clear_tokens` was invoked through the bridge.
		pub fn clear_calls(&self) -> u64 {
			self.clear_calls.load(Ordering::SeqCst)
		}

		/// Returns how many times `logout` was invoked through the bridge.
		pub fn logout_calls(&self) -> u64 {
			self.logout_calls.load(Ordering::SeqCst)
		}
	}
	impl SessionBridge for RecordingSession {
		fn tokens(&self) -> Option<TokenPair> {
			self.inner.tokens()
		}

		fn set_tokens(&self, pair: TokenPair) {
			self.inner.set_tokens(pair);
		}

		fn clear_tokens(&self) {
			self.clear_calls.fetch_add(1, Ordering::SeqCst);
			self.inner.clear_tokens();
		}

		fn logout(&self) {
			self.logout_calls.fetch_add(1, Ordering::SeqCst);
			self.inner.logout();
		}
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use tokio::sync::oneshot;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, refresh_coordinator as _};

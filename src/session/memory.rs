//! Thread-safe in-memory [`SessionBridge`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	session::{SessionBridge, TokenPair},
};

#[derive(Debug, Default)]
struct SessionSlot {
	authenticated: bool,
	tokens: Option<TokenPair>,
}

/// In-process session backend guarding its slot with a read-write lock.
///
/// Cloning shares the slot, so an application context and its coordinator observe the same
/// session state.
#[derive(Clone, Debug, Default)]
pub struct MemorySession(Arc<RwLock<SessionSlot>>);
impl MemorySession {
	/// Stores the pair and raises the authentication flag, as an initial login would.
	pub fn sign_in(&self, pair: TokenPair) {
		let mut slot = self.0.write();

		slot.tokens = Some(pair);
		slot.authenticated = true;
	}

	/// Returns whether the broader session is currently authenticated.
	pub fn authenticated(&self) -> bool {
		self.0.read().authenticated
	}
}
impl SessionBridge for MemorySession {
	fn tokens(&self) -> Option<TokenPair> {
		self.0.read().tokens.clone()
	}

	fn set_tokens(&self, pair: TokenPair) {
		self.0.write().tokens = Some(pair);
	}

	fn clear_tokens(&self) {
		self.0.write().tokens = None;
	}

	fn logout(&self) {
		self.0.write().authenticated = false;
	}
}

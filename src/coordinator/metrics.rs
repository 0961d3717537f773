// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters tracking how refresh attempts settle for one coordinator.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempted: AtomicU64,
	rejected: AtomicU64,
	resolved: AtomicU64,
}
impl RefreshMetrics {
	/// Total refresh attempts, counting queued joiners as well as cycle initiators.
	pub fn attempted(&self) -> u64 {
		self.attempted.load(Ordering::Relaxed)
	}

	/// Attempts that resolved with an access token.
	pub fn resolved(&self) -> u64 {
		self.resolved.load(Ordering::Relaxed)
	}

	/// Attempts that surfaced an error to their caller.
	pub fn rejected(&self) -> u64 {
		self.rejected.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempted.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_settled(&self, resolved: bool) {
		let counter = if resolved { &self.resolved } else { &self.rejected };

		counter.fetch_add(1, Ordering::Relaxed);
	}
}

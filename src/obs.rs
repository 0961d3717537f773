//! Optional observability helpers for refresh cycles.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `refresh_coordinator.cycle` with a `stage`
//!   field naming the call site.
//! - Enable `metrics` to increment the `refresh_coordinator_cycle_total` counter for every
//!   attempt/resolve/reject, labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each refresh attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CycleOutcome {
	/// Entry into a coordinator operation.
	Attempt,
	/// Caller received a fresh or still-valid access token.
	Resolved,
	/// Caller received an error.
	Rejected,
}
impl CycleOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CycleOutcome::Attempt => "attempt",
			CycleOutcome::Resolved => "resolved",
			CycleOutcome::Rejected => "rejected",
		}
	}
}
impl Display for CycleOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

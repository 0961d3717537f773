// self
use crate::obs::CycleOutcome;

/// Records a refresh cycle outcome via the global metrics recorder (when enabled).
pub fn record_cycle_outcome(outcome: CycleOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"refresh_coordinator_cycle_total",
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_cycle_outcome_noop_without_metrics() {
		record_cycle_outcome(CycleOutcome::Rejected);
	}
}

//! Single-flight refresh coordination for a session's token pair.
//!
//! [`RefreshCoordinator`] owns the `Idle`/`Refreshing` phase flag and an ordered waiter queue.
//! Callers that need a fresh token while a refresh is already in flight attach to the running
//! cycle instead of issuing a second transport call, and every member of a cycle observes the
//! identical outcome. A failed cycle clears the session bridge and invokes its logout hook, so
//! the forced sign-out is visible to the caller that needed the token rather than silently
//! retried.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::mem;
// self
use crate::{
	_prelude::*,
	jwt::{self, DEFAULT_EXPIRY_BUFFER},
	obs::{self, CycleOutcome, CycleSpan},
	session::SessionBridge,
	transport::RefreshTransport,
};

type CycleWaiter = oneshot::Sender<Result<String>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum RefreshPhase {
	#[default]
	Idle,
	Refreshing,
}

/// Invariants: at most one cycle drives a transport call at a time, and the waiter list is
/// non-empty only while the phase is `Refreshing`.
#[derive(Debug, Default)]
struct RefreshState {
	generation: u64,
	phase: RefreshPhase,
	waiters: Vec<CycleWaiter>,
}

/// Coordinates token refreshes for one session, collapsing concurrent demand into a single
/// in-flight transport call.
///
/// Construct one instance per session/application context and share it by cloning; there is no
/// module-level singleton, so tests build isolated coordinators freely. The coordinator only
/// reads and writes credentials through its [`SessionBridge`] and never keeps a private copy
/// beyond the duration of one refresh call.
#[derive(Clone)]
pub struct RefreshCoordinator {
	expiry_buffer: Duration,
	metrics: Arc<RefreshMetrics>,
	session: Arc<dyn SessionBridge>,
	state: Arc<Mutex<RefreshState>>,
	transport: Arc<dyn RefreshTransport>,
}
impl RefreshCoordinator {
	/// Creates a coordinator over the provided session bridge and refresh transport, using the
	/// default 300-second expiry buffer.
	pub fn new(session: Arc<dyn SessionBridge>, transport: Arc<dyn RefreshTransport>) -> Self {
		Self {
			expiry_buffer: DEFAULT_EXPIRY_BUFFER,
			metrics: Default::default(),
			session,
			state: Default::default(),
			transport,
		}
	}

	/// Overrides the proactive-renewal buffer; negative values clamp to zero.
	pub fn with_expiry_buffer(mut self, buffer: Duration) -> Self {
		self.expiry_buffer = if buffer.is_negative() { Duration::ZERO } else { buffer };

		self
	}

	/// Returns the configured proactive-renewal buffer.
	pub fn expiry_buffer(&self) -> Duration {
		self.expiry_buffer
	}

	/// Returns the cycle counters recorded by this coordinator.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Returns a usable access token, or `None` when the caller must be treated as
	/// unauthenticated.
	///
	/// This is the primary integration point, typically invoked by an outgoing-request
	/// interceptor. The fast path returns the stored token without any transport call whenever
	/// it passes the buffered expiry check; otherwise the call falls through to
	/// [`Self::refresh_access_token`] and maps its failure to `None` (the session bridge has
	/// already been cleared by then). With no stored session it returns `None` immediately:
	/// there is nothing to refresh toward.
	pub async fn valid_access_token(&self) -> Option<String> {
		let pair = self.session.tokens()?;
		let access = pair.access_token.expose().to_string();

		if !jwt::is_token_expired_with(&access, self.expiry_buffer) {
			return Some(access);
		}

		self.refresh_access_token().await.ok()
	}

	/// Exchanges the stored refresh token for a fresh pair, joining the in-flight cycle when
	/// one already exists.
	///
	/// Exactly one transport call happens per cycle no matter how many callers arrive while it
	/// is in flight; all of them settle with the identical outcome, in the order they joined.
	/// On success the new pair replaces the old one wholesale before any waiter resolves; on
	/// failure the session bridge is cleared and its logout hook invoked before any waiter sees
	/// the error. Either way the phase returns to idle, so a later call starts an independent
	/// cycle.
	pub async fn refresh_access_token(&self) -> Result<String> {
		let span = CycleSpan::new("refresh_access_token");

		obs::record_cycle_outcome(CycleOutcome::Attempt);
		self.metrics.record_attempt();

		let result = span.instrument(self.join_or_start_cycle()).await;

		self.metrics.record_settled(result.is_ok());

		match &result {
			Ok(_) => obs::record_cycle_outcome(CycleOutcome::Resolved),
			Err(_) => obs::record_cycle_outcome(CycleOutcome::Rejected),
		}

		result
	}

	/// Abandons any in-flight bookkeeping and returns the phase to idle.
	///
	/// Pending waiters are rejected with [`Error::Interrupted`] immediately; a transport call
	/// that is still running settles into a stale generation and its result is discarded. Meant
	/// for explicit logout paths and tests.
	pub fn clear_refresh_state(&self) {
		let _guard = CycleSpan::new("clear_refresh_state").entered();
		let waiters = {
			let mut state = self.state.lock();

			state.generation += 1;
			state.phase = RefreshPhase::Idle;

			mem::take(&mut state.waiters)
		};

		for waiter in waiters {
			let _ = waiter.send(Err(Error::Interrupted));
		}
	}

	async fn join_or_start_cycle(&self) -> Result<String> {
		// Precondition: without a refresh token there is nothing to exchange; fail before any
		// state transition or network activity.
		if self.session.tokens().is_none() {
			return Err(Error::NoRefreshToken);
		}

		let (tx, rx) = oneshot::channel();
		let initiated = {
			let mut state = self.state.lock();

			state.waiters.push(tx);

			match state.phase {
				RefreshPhase::Refreshing => None,
				RefreshPhase::Idle => {
					state.phase = RefreshPhase::Refreshing;
					state.generation += 1;

					Some(state.generation)
				},
			}
		};

		if let Some(generation) = initiated {
			let session = Arc::clone(&self.session);
			let transport = Arc::clone(&self.transport);
			let state = Arc::clone(&self.state);

			// The driver runs detached so a started cycle settles even when every caller is
			// cancelled mid-await.
			tokio::spawn(async move {
				let outcome = Self::drive_cycle(&*session, &*transport).await;

				Self::settle_cycle(&state, generation, outcome);
			});
		}

		match rx.await {
			Ok(outcome) => outcome,
			Err(_) => Err(Error::Interrupted),
		}
	}

	async fn drive_cycle(
		session: &dyn SessionBridge,
		transport: &dyn RefreshTransport,
	) -> Result<String> {
		// The token is sampled here, after the cycle won the phase transition, so a rotation
		// committed by an earlier cycle is always picked up. A bridge emptied in the meantime
		// means the session ended; the cycle is abandoned without touching the transport.
		let refresh_token = match session.tokens() {
			Some(pair) => pair.refresh_token.expose().to_string(),
			None => return Err(Error::Interrupted),
		};

		match transport.refresh(&refresh_token).await {
			Ok(pair) => {
				// Tolerate an out-of-band logout during the network call: the fetched pair is
				// discarded instead of resurrecting a session the user already left.
				if session.tokens().is_none() {
					return Err(Error::Interrupted);
				}

				let access = pair.access_token.expose().to_string();

				session.set_tokens(pair);

				Ok(access)
			},
			Err(e) => {
				// A failed refresh means the session is no longer valid, not a transient
				// condition to retry.
				session.clear_tokens();
				session.logout();

				Err(Error::Transport(e))
			},
		}
	}

	fn settle_cycle(state: &Mutex<RefreshState>, generation: u64, outcome: Result<String>) {
		let waiters = {
			let mut state = state.lock();

			// A reset moved the coordinator past this cycle; its waiters were rejected already.
			if state.generation != generation {
				return;
			}

			state.phase = RefreshPhase::Idle;

			mem::take(&mut state.waiters)
		};

		for waiter in waiters {
			let _ = waiter.send(outcome.clone());
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("RefreshCoordinator")
			.field("expiry_buffer", &self.expiry_buffer)
			.field("phase", &state.phase)
			.field("queued_waiters", &state.waiters.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::{
		RecordingSession, ScriptedTransport, build_test_coordinator, test_token_pair,
	};

	#[test]
	fn negative_expiry_buffer_clamps_to_zero() {
		let coordinator = build_test_coordinator(
			Arc::new(RecordingSession::new()),
			Arc::new(ScriptedTransport::new()),
		)
		.with_expiry_buffer(Duration::seconds(-30));

		assert_eq!(coordinator.expiry_buffer(), Duration::ZERO);
	}

	#[tokio::test]
	async fn driver_exchanges_the_token_stored_at_cycle_start() {
		let session = RecordingSession::signed_in(test_token_pair("access-old", "refresh-old"));

		// A rotation landing between a caller's precondition check and its cycle winning the
		// phase transition must be picked up; the superseded token is never sent.
		session.set_tokens(test_token_pair("access-rotated", "refresh-rotated"));

		let transport = ScriptedTransport::new();

		transport.push_success(test_token_pair("access-new", "refresh-new"));

		let outcome = RefreshCoordinator::drive_cycle(&session, &transport).await;

		assert_eq!(outcome, Ok("access-new".into()));
		assert_eq!(transport.requested_tokens(), vec!["refresh-rotated".to_string()]);
	}

	#[tokio::test]
	async fn driver_abandons_a_cycle_whose_bridge_emptied() {
		let session = RecordingSession::new();
		let transport = ScriptedTransport::new();
		let outcome = RefreshCoordinator::drive_cycle(&session, &transport).await;

		assert_eq!(outcome, Err(Error::Interrupted));
		assert_eq!(transport.calls(), 0);
		assert_eq!(session.clear_calls(), 0);
		assert_eq!(session.logout_calls(), 0);
	}

	#[test]
	fn debug_reports_phase_without_credentials() {
		let coordinator = build_test_coordinator(
			Arc::new(RecordingSession::new()),
			Arc::new(ScriptedTransport::new()),
		);
		let rendered = format!("{coordinator:?}");

		assert!(rendered.contains("Idle"));
		assert!(rendered.contains("queued_waiters: 0"));
	}
}

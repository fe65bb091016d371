// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for login and logout flows of one coordinator.
#[derive(Debug, Default)]
pub struct FlowMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	discarded: AtomicU64,
}
impl FlowMetrics {
	/// Returns the number of flows started, including ones that failed fast.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of flows that resolved without a failure (logouts included).
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of flows that resolved with a failure.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of flows that have resolved either way.
	pub fn completed(&self) -> u64 {
		self.successes() + self.failures()
	}

	/// Returns the number of results dropped because no observer was registered.
	pub fn discarded(&self) -> u64 {
		self.discarded.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_discarded(&self) {
		self.discarded.fetch_add(1, Ordering::Relaxed);
	}
}

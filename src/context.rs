//! Fixed delivery context for observer callbacks.
//!
//! Provider SDKs complete on whatever thread suits them. The coordinator re-marshals every
//! completion onto one [`MainContext`] so the observer never runs concurrently with itself and
//! sees results in the order the provider calls finished.

// std
use std::panic::{self, AssertUnwindSafe};
// crates.io
use tokio::{runtime::Handle, sync::mpsc};
// self
use crate::{_prelude::*, error::ConfigError, obs};

/// Unit of work scheduled onto a [`MainContext`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Serialized executor on which observer callbacks run.
///
/// Implementations must run jobs one at a time, in dispatch order. A UI host typically forwards
/// jobs to its main thread's event loop.
pub trait MainContext
where
	Self: Send + Sync,
{
	/// Schedules `job`; must not run it inline on the caller's stack.
	fn dispatch(&self, job: Job);
}

/// Default [`MainContext`]: a single tokio task draining an unbounded queue.
///
/// A panicking job is contained and logged; later jobs still run.
#[derive(Clone, Debug)]
pub struct SerialContext {
	tx: mpsc::UnboundedSender<Job>,
}
impl SerialContext {
	/// Starts the worker on the ambient tokio runtime.
	pub fn spawn() -> Result<Self, ConfigError> {
		let handle = Handle::try_current().map_err(|_| ConfigError::RuntimeUnavailable)?;

		Ok(Self::spawn_on(&handle))
	}

	/// Starts the worker on the provided runtime.
	pub fn spawn_on(handle: &Handle) -> Self {
		let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

		handle.spawn(async move {
			while let Some(job) = rx.recv().await {
				if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
					obs::flow_event!(error, "A delivery job panicked; continuing with the next one.");
				}
			}
		});

		Self { tx }
	}

	/// Returns `true` while the worker task is still accepting jobs.
	pub fn is_running(&self) -> bool {
		!self.tx.is_closed()
	}
}
impl MainContext for SerialContext {
	fn dispatch(&self, job: Job) {
		if self.tx.send(job).is_err() {
			obs::flow_event!(warn, "Delivery context is shut down; dropping a job.");
		}
	}
}

//! Optional observability helpers for sign-in flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `authn_facade.flow` with the `flow` (login
//!   kind) and `stage` (call site) fields, plus the facade's diagnostic events.
//! - Enable `metrics` to increment the `authn_facade_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Emits a `tracing` event at `$level` when the `tracing` feature is enabled; expands to nothing
/// otherwise.
macro_rules! flow_event {
	($level:ident, $($arg:tt)+) => {
		#[cfg(feature = "tracing")]
		{
			::tracing::$level!($($arg)+);
		}
	};
}
pub(crate) use flow_event;

/// Login flows observed by the facade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Identifier + secret login.
	Password,
	/// Sign in with Apple.
	AppleId,
	/// Google sign-in.
	Google,
	/// Sign-out.
	Logout,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Password => "password",
			FlowKind::AppleId => "apple_id",
			FlowKind::Google => "google",
			FlowKind::Logout => "logout",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a login operation.
	Attempt,
	/// Identity delivered to the observer.
	Success,
	/// Failure delivered to the observer.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

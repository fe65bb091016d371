//! The authentication coordinator and its login flows.
//!
//! [`Coordinator`] is the facade the host talks to. Each public login call validates what it
//! can synchronously, spawns the provider work on the runtime captured at build time, and
//! returns immediately. Exactly one [`AuthenticationResult`] comes out of every login call; it is
//! dispatched onto the coordinator's [`MainContext`] and handed to whichever observer is
//! registered when the job runs there.

mod apple;
mod google;
mod logout;
mod metrics;
mod password;

pub use metrics::FlowMetrics;

// std
use std::{future, time::Duration as StdDuration};
// crates.io
use tokio::{runtime::Handle, task::JoinError};
// self
use crate::{
	_prelude::*,
	auth::{AuthenticationResult, Identity},
	config::{EnvOptions, OptionsSource},
	context::{MainContext, SerialContext},
	error::{ConfigError, ProviderError},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	observer::{AuthenticationObserver, ObserverSlot},
	provider::{AppleAuthorizationController, GoogleSignIn, IdentityBackend, ProviderKind},
};

/// Facade unifying password, Apple ID, and Google logins behind one observer.
///
/// The coordinator holds no authentication state of its own: it only routes calls to the
/// configured adapters and forwards their outcomes. Clones share the observer slot, adapters,
/// delivery context, and metrics.
#[derive(Clone)]
pub struct Coordinator {
	backend: Arc<dyn IdentityBackend>,
	apple: Option<Arc<dyn AppleAuthorizationController>>,
	google: Option<Arc<dyn GoogleSignIn>>,
	options: Arc<dyn OptionsSource>,
	context: Arc<dyn MainContext>,
	runtime: Handle,
	observer: ObserverSlot,
	apple_timeout: Option<StdDuration>,
	metrics: Arc<FlowMetrics>,
}
impl Coordinator {
	/// Starts a builder around the identity backend every flow exchanges credentials with.
	pub fn builder(backend: Arc<dyn IdentityBackend>) -> CoordinatorBuilder {
		CoordinatorBuilder::new(backend)
	}

	/// Registers `observer`, replacing any previously registered one.
	///
	/// Results still in flight are delivered to the observer registered when they arrive.
	pub fn register_observer(&self, observer: Arc<dyn AuthenticationObserver>) {
		self.observer.replace(Some(observer));
	}

	/// Removes the registered observer; later results are discarded.
	pub fn clear_observer(&self) {
		self.observer.replace(None);
	}

	/// Returns `true` when an observer is registered.
	pub fn has_observer(&self) -> bool {
		self.observer.is_registered()
	}

	/// Counters shared by every clone of this coordinator.
	pub fn metrics(&self) -> &FlowMetrics {
		&self.metrics
	}

	/// Runs a login flow and delivers its single result.
	fn spawn_login<F>(&self, kind: FlowKind, stage: &'static str, flow: F)
	where
		F: 'static + Send + Future<Output = Result<Identity>>,
	{
		self.spawn_flow(kind, stage, async move { Some(AuthenticationResult::from(flow.await)) });
	}

	/// Delivers a failure detected before any provider call, through the same path as provider
	/// results so ordering and metrics stay uniform.
	fn fail_fast(&self, kind: FlowKind, stage: &'static str, err: impl Into<Error>) {
		let result = AuthenticationResult::Failure(err.into());

		self.spawn_flow(kind, stage, future::ready(Some(result)));
	}

	/// Spawns `flow` on the captured runtime. A `None` output completes the flow silently.
	///
	/// The flow runs in its own task, watched by a supervising one; a flow that panics still
	/// resolves to exactly one failure.
	fn spawn_flow<F>(&self, kind: FlowKind, stage: &'static str, flow: F)
	where
		F: 'static + Send + Future<Output = Option<AuthenticationResult>>,
	{
		let span = FlowSpan::new(kind, stage);
		let this = self.clone();

		obs::record_flow_outcome(kind, FlowOutcome::Attempt);
		this.metrics.record_attempt();

		let task = self.runtime.spawn(span.instrument(flow));

		self.runtime.spawn(async move {
			let result = match task.await {
				Ok(result) => result,
				Err(e) => {
					obs::flow_event!(error, flow = kind.as_str(), "Flow task aborted: {e}.");

					Some(AuthenticationResult::Failure(aborted(kind, e)))
				},
			};
			let outcome = match &result {
				Some(AuthenticationResult::Failure(_)) => FlowOutcome::Failure,
				_ => FlowOutcome::Success,
			};

			span.record_outcome(outcome);
			obs::record_flow_outcome(kind, outcome);

			if let Some(result) = result {
				this.deliver(result);
			}

			// Counted after dispatch so a job queued behind this point runs after the delivery.
			match outcome {
				FlowOutcome::Failure => this.metrics.record_failure(),
				_ => this.metrics.record_success(),
			}
		});
	}

	/// Re-marshals `result` onto the delivery context and hands it to the current observer.
	fn deliver(&self, result: AuthenticationResult) {
		let observer = self.observer.clone();
		let metrics = self.metrics.clone();

		self.context.dispatch(Box::new(move || {
			if !observer.deliver(result) {
				metrics.record_discarded();
				obs::flow_event!(warn, "No observer is registered; discarding the result.");
			}
		}));
	}
}
impl Debug for Coordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Coordinator")
			.field("apple", &self.apple.is_some())
			.field("google", &self.google.is_some())
			.field("observer", &self.observer)
			.field("apple_timeout", &self.apple_timeout)
			.field("metrics", &self.metrics)
			.finish()
	}
}

/// Failure delivered for a flow whose task panicked or was cancelled.
fn aborted(kind: FlowKind, e: JoinError) -> Error {
	let provider = match kind {
		FlowKind::AppleId => ProviderKind::Apple,
		FlowKind::Google => ProviderKind::Google,
		FlowKind::Password | FlowKind::Logout => ProviderKind::Password,
	};
	let err =
		ProviderError::new(provider, ProviderError::PROVIDER_PANICKED).with_message(e.to_string());

	match kind {
		FlowKind::Logout => Error::SignOut(err),
		_ => Error::Provider(err),
	}
}

/// Builder for [`Coordinator`] values.
pub struct CoordinatorBuilder {
	/// Identity backend used by every flow.
	pub backend: Arc<dyn IdentityBackend>,
	/// Apple authorization controller; Apple logins fail with a configuration error without one.
	pub apple: Option<Arc<dyn AppleAuthorizationController>>,
	/// Google sign-in SDK; Google logins fail with a configuration error without one.
	pub google: Option<Arc<dyn GoogleSignIn>>,
	/// Options source consulted on every Google login. Defaults to [`EnvOptions::default`].
	pub options: Option<Arc<dyn OptionsSource>>,
	/// Delivery context. Defaults to a [`SerialContext`] on the coordinator's runtime.
	pub context: Option<Arc<dyn MainContext>>,
	/// Runtime that drives provider work. Defaults to the runtime active during `build`.
	pub runtime: Option<Handle>,
	/// Upper bound on waiting for the Apple controller's callback; unbounded when unset.
	pub apple_timeout: Option<StdDuration>,
}
impl CoordinatorBuilder {
	/// Creates a builder with only the identity backend set.
	pub fn new(backend: Arc<dyn IdentityBackend>) -> Self {
		Self {
			backend,
			apple: None,
			google: None,
			options: None,
			context: None,
			runtime: None,
			apple_timeout: None,
		}
	}

	/// Enables Apple logins through `controller`.
	pub fn apple(mut self, controller: Arc<dyn AppleAuthorizationController>) -> Self {
		self.apple = Some(controller);

		self
	}

	/// Enables Google logins through `sdk`.
	pub fn google(mut self, sdk: Arc<dyn GoogleSignIn>) -> Self {
		self.google = Some(sdk);

		self
	}

	/// Sets the options source.
	pub fn options(mut self, options: Arc<dyn OptionsSource>) -> Self {
		self.options = Some(options);

		self
	}

	/// Sets the delivery context.
	pub fn context(mut self, context: Arc<dyn MainContext>) -> Self {
		self.context = Some(context);

		self
	}

	/// Sets the runtime that drives provider work.
	pub fn runtime(mut self, runtime: Handle) -> Self {
		self.runtime = Some(runtime);

		self
	}

	/// Bounds the wait for the Apple controller's callback.
	pub fn apple_timeout(mut self, timeout: StdDuration) -> Self {
		self.apple_timeout = Some(timeout);

		self
	}

	/// Builds the coordinator, capturing the ambient tokio runtime when none was set.
	pub fn build(self) -> Result<Coordinator, ConfigError> {
		let runtime = match self.runtime {
			Some(runtime) => runtime,
			None => Handle::try_current().map_err(|_| ConfigError::RuntimeUnavailable)?,
		};
		let context = match self.context {
			Some(context) => context,
			None => Arc::new(SerialContext::spawn_on(&runtime)),
		};
		let options = match self.options {
			Some(options) => options,
			None => Arc::new(EnvOptions::default()),
		};

		Ok(Coordinator {
			backend: self.backend,
			apple: self.apple,
			google: self.google,
			options,
			context,
			runtime,
			observer: ObserverSlot::default(),
			apple_timeout: self.apple_timeout,
			metrics: Default::default(),
		})
	}
}
impl Debug for CoordinatorBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CoordinatorBuilder")
			.field("apple", &self.apple.is_some())
			.field("google", &self.google.is_some())
			.field("options", &self.options.is_some())
			.field("context", &self.context.is_some())
			.field("runtime", &self.runtime.is_some())
			.field("apple_timeout", &self.apple_timeout)
			.finish()
	}
}

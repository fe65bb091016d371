//! Scripted provider stubs shared by the integration tests.

#![allow(dead_code)]

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	thread::{self, ThreadId},
	time::Duration,
};
// crates.io
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
// self
use authn_facade::{
	auth::{AuthenticationResult, Identity, Secret, UserId},
	config::{AppOptions, StaticOptions},
	context::{Job, MainContext, SerialContext},
	error::ProviderError,
	flows::{Coordinator, CoordinatorBuilder},
	observer::ChannelObserver,
	provider::{
		AppleAuthorizationController, AppleAuthorizationRequest, AuthorizationCredential,
		AuthorizationDelegate, FederatedCredential, GoogleSignIn, GoogleSignInConfig, GoogleUser,
		IdentityBackend, PresentationAnchor, ProviderFuture, ProviderKind,
	},
};

pub const VALID_IDENTIFIER: &str = "user@x.com";
pub const VALID_SECRET: &str = "correct";
pub const GOOGLE_CLIENT_ID: &str = "1234-abc.apps.googleusercontent.com";

const WAIT: Duration = Duration::from_secs(2);

type CredentialFactory =
	Box<dyn Fn(&AppleAuthorizationRequest) -> AuthorizationCredential + Send + Sync>;

/// Identity backend that accepts one identifier/secret pair and every federated credential.
#[derive(Default)]
pub struct StubBackend {
	pub password_calls: AtomicUsize,
	pub credential_calls: AtomicUsize,
	pub sign_out_calls: AtomicUsize,
	pub credentials: Mutex<Vec<FederatedCredential>>,
	sign_out_error: Mutex<Option<&'static str>>,
	credential_error: Mutex<Option<&'static str>>,
	panic_on_password: AtomicBool,
	gate: Mutex<Option<oneshot::Receiver<()>>>,
}
impl StubBackend {
	/// Holds the next password sign-in until the returned sender fires.
	pub fn hold_next_password(&self) -> oneshot::Sender<()> {
		let (tx, rx) = oneshot::channel();

		*self.gate.lock() = Some(rx);

		tx
	}

	pub fn fail_sign_out(&self, code: &'static str) {
		*self.sign_out_error.lock() = Some(code);
	}

	/// Rejects every federated credential exchange with `code`.
	pub fn reject_credentials(&self, code: &'static str) {
		*self.credential_error.lock() = Some(code);
	}

	/// Makes the next password sign-in future panic when polled.
	pub fn panic_on_next_password(&self) {
		self.panic_on_password.store(true, Ordering::SeqCst);
	}

	pub fn password_calls(&self) -> usize {
		self.password_calls.load(Ordering::SeqCst)
	}

	pub fn credential_calls(&self) -> usize {
		self.credential_calls.load(Ordering::SeqCst)
	}

	pub fn sign_out_calls(&self) -> usize {
		self.sign_out_calls.load(Ordering::SeqCst)
	}
}
impl IdentityBackend for StubBackend {
	fn sign_in_with_password<'a>(
		&'a self,
		identifier: &'a str,
		secret: &'a Secret,
	) -> ProviderFuture<'a, Identity> {
		Box::pin(async move {
			self.password_calls.fetch_add(1, Ordering::SeqCst);

			if self.panic_on_password.swap(false, Ordering::SeqCst) {
				panic!("password backend blew up");
			}

			let gate = self.gate.lock().take();

			if let Some(gate) = gate {
				let _ = gate.await;
			}
			if identifier == VALID_IDENTIFIER && secret.expose() == VALID_SECRET {
				let user_id = UserId::new("123").expect("Stub user id should be valid.");

				Ok(Identity::new(user_id, ProviderKind::Password).with_email(identifier))
			} else {
				Err(ProviderError::new(ProviderKind::Password, "INVALID_CREDENTIAL"))
			}
		})
	}

	fn sign_in_with_credential(
		&self,
		credential: FederatedCredential,
	) -> ProviderFuture<'_, Identity> {
		Box::pin(async move {
			self.credential_calls.fetch_add(1, Ordering::SeqCst);

			let provider = credential.provider;
			let rejection = *self.credential_error.lock();

			if let Some(code) = rejection {
				return Err(ProviderError::new(provider, code));
			}

			let user_id = UserId::new(format!("fed-{provider}"))
				.expect("Stub user id should be valid.");

			self.credentials.lock().push(credential);

			Ok::<_, ProviderError>(Identity::new(user_id, provider))
		})
	}

	fn sign_out(&self) -> ProviderFuture<'_, ()> {
		Box::pin(async move {
			self.sign_out_calls.fetch_add(1, Ordering::SeqCst);

			let failure = *self.sign_out_error.lock();

			match failure {
				Some(code) => Err(ProviderError::new(ProviderKind::Password, code)),
				None => Ok(()),
			}
		})
	}
}

/// What the stub Apple controller does with each request.
pub enum AppleScript {
	/// Completes with the credential built from the request.
	Complete(CredentialFactory),
	/// Completes with a controller error.
	Fail(&'static str),
	/// Completes with the error, then tries again with the credential.
	Twice(&'static str, AuthorizationCredential),
	/// Drops the delegate without calling it.
	Drop,
	/// Keeps the delegate without ever calling it.
	Hang,
}

pub struct StubAppleController {
	script: AppleScript,
	pub requests: Mutex<Vec<AppleAuthorizationRequest>>,
	pub late_acceptances: Mutex<Vec<bool>>,
	kept: Mutex<Vec<AuthorizationDelegate>>,
}
impl StubAppleController {
	pub fn new(script: AppleScript) -> Self {
		Self {
			script,
			requests: Mutex::new(Vec::new()),
			late_acceptances: Mutex::new(Vec::new()),
			kept: Mutex::new(Vec::new()),
		}
	}

	/// Completes with whatever `build` makes of the request.
	pub fn completing(
		build: impl 'static + Fn(&AppleAuthorizationRequest) -> AuthorizationCredential + Send + Sync,
	) -> Self {
		Self::new(AppleScript::Complete(Box::new(build)))
	}
}
impl AppleAuthorizationController for StubAppleController {
	fn perform_requests(&self, request: AppleAuthorizationRequest, delegate: AuthorizationDelegate) {
		self.requests.lock().push(request.clone());

		match &self.script {
			AppleScript::Complete(build) => {
				delegate.did_complete_with_authorization(build(&request));
			},
			AppleScript::Fail(code) => {
				delegate.did_complete_with_error(ProviderError::new(ProviderKind::Apple, *code));
			},
			AppleScript::Twice(code, credential) => {
				delegate.did_complete_with_error(ProviderError::new(ProviderKind::Apple, *code));

				let accepted = delegate.did_complete_with_authorization(credential.clone());

				self.late_acceptances.lock().push(accepted);
			},
			AppleScript::Drop => drop(delegate),
			AppleScript::Hang => self.kept.lock().push(delegate),
		}
	}
}

/// Google SDK stub returning a fixed user, or failing with a fixed code.
pub struct StubGoogleSignIn {
	user: GoogleUser,
	failure: Option<&'static str>,
	pub configured: Mutex<Vec<GoogleSignInConfig>>,
	pub calls: Mutex<Vec<(&'static str, ThreadId)>>,
	pub sign_in_calls: AtomicUsize,
	pub sign_out_calls: AtomicUsize,
}
impl StubGoogleSignIn {
	pub fn new(user: GoogleUser) -> Self {
		Self {
			user,
			failure: None,
			configured: Mutex::new(Vec::new()),
			calls: Mutex::new(Vec::new()),
			sign_in_calls: AtomicUsize::new(0),
			sign_out_calls: AtomicUsize::new(0),
		}
	}

	/// Fails every sign-in with `code`.
	pub fn failing(code: &'static str) -> Self {
		Self { failure: Some(code), ..Self::new(GoogleUser::default()) }
	}

	pub fn sign_in_calls(&self) -> usize {
		self.sign_in_calls.load(Ordering::SeqCst)
	}

	pub fn sign_out_calls(&self) -> usize {
		self.sign_out_calls.load(Ordering::SeqCst)
	}

	fn record(&self, call: &'static str) {
		self.calls.lock().push((call, thread::current().id()));
	}
}
impl GoogleSignIn for StubGoogleSignIn {
	fn configure(&self, config: GoogleSignInConfig) {
		self.record("configure");
		self.configured.lock().push(config);
	}

	fn sign_in(&self, _: Arc<dyn PresentationAnchor>) -> ProviderFuture<'static, GoogleUser> {
		self.record("sign_in");
		self.sign_in_calls.fetch_add(1, Ordering::SeqCst);

		let outcome = match self.failure {
			Some(code) => Err(ProviderError::new(ProviderKind::Google, code)),
			None => Ok(self.user.clone()),
		};

		Box::pin(async move { outcome })
	}

	fn sign_out(&self) {
		self.record("sign_out");
		self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
	}
}

/// Delivery context backed by one dedicated OS thread, standing in for a UI thread.
pub struct ThreadContext {
	tx: mpsc::UnboundedSender<Job>,
	pub thread: ThreadId,
}
impl ThreadContext {
	pub fn spawn() -> Self {
		let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
		let handle = thread::spawn(move || {
			while let Some(job) = rx.blocking_recv() {
				job();
			}
		});

		Self { tx, thread: handle.thread().id() }
	}
}
impl MainContext for ThreadContext {
	fn dispatch(&self, job: Job) {
		let _ = self.tx.send(job);
	}
}

pub struct Window {
	pub visible: bool,
}
impl PresentationAnchor for Window {
	fn is_displayable(&self) -> bool {
		self.visible
	}
}

pub fn visible_window() -> Arc<dyn PresentationAnchor> {
	Arc::new(Window { visible: true })
}

pub fn google_options() -> Arc<StaticOptions> {
	Arc::new(StaticOptions::new(AppOptions::default().with_client_id(GOOGLE_CLIENT_ID)))
}

/// Coordinator wired to stubs, plus a handle on the delivery context it uses.
pub struct Harness {
	pub coordinator: Coordinator,
	pub context: SerialContext,
}
impl Harness {
	/// Builds a coordinator with empty options; `configure` adds adapters or overrides.
	pub fn new(
		backend: Arc<StubBackend>,
		configure: impl FnOnce(CoordinatorBuilder) -> CoordinatorBuilder,
	) -> Self {
		let context = SerialContext::spawn().expect("Tests run inside a tokio runtime.");
		let builder = Coordinator::builder(backend)
			.context(Arc::new(context.clone()))
			.options(Arc::new(StaticOptions::default()));
		let coordinator = configure(builder).build().expect("Coordinator should build.");

		Self { coordinator, context }
	}

	/// Registers a fresh channel observer and returns its receiver.
	pub fn observe(&self) -> mpsc::UnboundedReceiver<AuthenticationResult> {
		let (observer, rx) = ChannelObserver::new();

		self.coordinator.register_observer(Arc::new(observer));

		rx
	}

	/// Waits until `completed` flows have resolved and every delivery they queued has run.
	pub async fn settle(&self, completed: u64) {
		tokio::time::timeout(WAIT, async {
			while self.coordinator.metrics().completed() < completed {
				tokio::time::sleep(Duration::from_millis(5)).await;
			}
		})
		.await
		.expect("Flows should complete in time.");

		let (tx, rx) = oneshot::channel();

		self.context.dispatch(Box::new(move || {
			let _ = tx.send(());
		}));
		tokio::time::timeout(WAIT, rx)
			.await
			.expect("Delivery context should drain in time.")
			.expect("Flush job should run.");
	}
}

/// Receives the next delivered result or panics after a short wait.
pub async fn next_result(
	rx: &mut mpsc::UnboundedReceiver<AuthenticationResult>,
) -> AuthenticationResult {
	tokio::time::timeout(WAIT, rx.recv())
		.await
		.expect("A result should arrive in time.")
		.expect("Observer channel should stay open.")
}

//! Demonstrates the push-style Apple flow: a platform controller that answers from its own
//! thread, an in-memory identity backend, and an observer implemented as a plain struct.

// std
use std::{sync::Arc, thread, time::Duration};
// crates.io
use color_eyre::Result;
use tokio::sync::Notify;
// self
use authn_facade::{
	auth::{Identity, Secret, UserId},
	error::{Error, ProviderError},
	flows::Coordinator,
	observer::AuthenticationObserver,
	provider::{
		AppleAuthorizationController, AppleAuthorizationRequest, AppleIdCredential,
		AuthorizationCredential, AuthorizationDelegate, FederatedCredential, IdentityBackend,
		PersonName, ProviderFuture, ProviderKind,
	},
};

/// Answers every request after a short delay, the way the platform sheet would.
struct SimulatedSheet;
impl AppleAuthorizationController for SimulatedSheet {
	fn perform_requests(&self, request: AppleAuthorizationRequest, delegate: AuthorizationDelegate) {
		println!("Presenting Apple sheet for {:?} (nonce {}).", request.scopes, request.nonce);

		thread::spawn(move || {
			thread::sleep(Duration::from_millis(50));

			delegate.did_complete_with_authorization(AuthorizationCredential::AppleId(
				AppleIdCredential {
					user: "001234.demo".into(),
					state: Some(request.state),
					identity_token: Some(b"eyJhbGciOiJSUzI1NiJ9.demo.signature".to_vec()),
					authorization_code: None,
					full_name: Some(PersonName {
						given_name: Some("Ada".into()),
						family_name: Some("Lovelace".into()),
					}),
					email: None,
				},
			));
		});
	}
}

/// Accepts every federated credential and mints a user id from the provider.
struct InMemoryBackend;
impl IdentityBackend for InMemoryBackend {
	fn sign_in_with_password<'a>(
		&'a self,
		_: &'a str,
		_: &'a Secret,
	) -> ProviderFuture<'a, Identity> {
		Box::pin(async {
			let err = ProviderError::new(ProviderKind::Password, "OPERATION_NOT_ALLOWED");

			Err::<Identity, _>(err)
		})
	}

	fn sign_in_with_credential(
		&self,
		credential: FederatedCredential,
	) -> ProviderFuture<'_, Identity> {
		Box::pin(async move {
			let user_id = UserId::new(format!("{}-user", credential.provider))
				.map_err(|e| ProviderError::new(credential.provider, "INVALID_ID").with_source(e))?;

			Ok::<_, ProviderError>(Identity::new(user_id, credential.provider))
		})
	}

	fn sign_out(&self) -> ProviderFuture<'_, ()> {
		Box::pin(async { Ok::<_, ProviderError>(()) })
	}
}

/// Prints outcomes and wakes `main` once one arrived.
struct PrintingObserver(Arc<Notify>);
impl AuthenticationObserver for PrintingObserver {
	fn on_authenticated(&self, identity: Identity) {
		println!(
			"Welcome, {} ({}).",
			identity.display_name.as_deref().unwrap_or("stranger"),
			identity.user_id
		);
		self.0.notify_one();
	}

	fn on_authentication_failed(&self, error: Error) {
		println!("Apple sign-in failed: {error}.");
		self.0.notify_one();
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let done = Arc::new(Notify::new());
	let coordinator = Coordinator::builder(Arc::new(InMemoryBackend))
		.apple(Arc::new(SimulatedSheet))
		.apple_timeout(Duration::from_secs(5))
		.build()?;

	coordinator.register_observer(Arc::new(PrintingObserver(done.clone())));
	coordinator.login_with_apple_id();
	done.notified().await;

	Ok(())
}

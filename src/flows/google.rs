//! Google sign-in followed by the federated token exchange.

// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	auth::Identity,
	config::OptionsSource,
	context::MainContext,
	error::{ConfigError, ProviderError},
	flows::Coordinator,
	obs::FlowKind,
	provider::{
		GoogleSignIn, GoogleSignInConfig, GoogleUser, IdentityBackend, PresentationAnchor,
		ProviderFuture, ProviderKind,
	},
};

type SignInStart = Result<ProviderFuture<'static, GoogleUser>, ConfigError>;

impl Coordinator {
	/// Presents Google sign-in on `presentation` and exchanges the resulting tokens.
	///
	/// The client identifier is read from the options source inside the flow, on every call.
	/// When it is missing the flow fails with [`ConfigError::MissingClientId`] before the SDK or
	/// the backend is touched; an anchor that cannot display UI fails with
	/// [`ConfigError::PresentationUnavailable`]. The SDK is configured and asked to sign in on the
	/// delivery context. A signed-in user lacking either token fails with
	/// [`Error::MalformedResponse`]; otherwise the exchange's own outcome is final.
	pub fn login_with_google(&self, presentation: Arc<dyn PresentationAnchor>) {
		const KIND: FlowKind = FlowKind::Google;
		const STAGE: &str = "login_with_google";

		let Some(sdk) = self.google.clone() else {
			return self.fail_fast(
				KIND,
				STAGE,
				ConfigError::ProviderNotConfigured { provider: ProviderKind::Google },
			);
		};
		let flow = GoogleFlow {
			options: self.options.clone(),
			context: self.context.clone(),
			sdk,
			backend: self.backend.clone(),
		};

		self.spawn_login(KIND, STAGE, flow.run(presentation));
	}
}

struct GoogleFlow {
	options: Arc<dyn OptionsSource>,
	context: Arc<dyn MainContext>,
	sdk: Arc<dyn GoogleSignIn>,
	backend: Arc<dyn IdentityBackend>,
}
impl GoogleFlow {
	async fn run(self, presentation: Arc<dyn PresentationAnchor>) -> Result<Identity> {
		let client_id = self.options.options()?.google_client_id()?;
		let (tx, rx) = oneshot::channel::<SignInStart>();
		let sdk = self.sdk.clone();

		self.context.dispatch(Box::new(move || {
			let started = if presentation.is_displayable() {
				sdk.configure(GoogleSignInConfig { client_id });

				Ok(sdk.sign_in(presentation))
			} else {
				Err(ConfigError::PresentationUnavailable)
			};

			let _ = tx.send(started);
		}));

		// The job only disappears without replying when the SDK call panicked on the context.
		let sign_in = rx.await.map_err(|_| {
			ProviderError::new(ProviderKind::Google, ProviderError::PROVIDER_PANICKED)
				.with_message("sign-in never started on the delivery context")
		})??;
		let user = sign_in.await?;
		let credential = user.to_credential()?;
		let mut identity = self.backend.sign_in_with_credential(credential).await?;

		if let Some(profile) = &user.profile {
			identity.backfill_profile(profile.name.as_deref(), profile.email.as_deref());
		}

		Ok(identity)
	}
}

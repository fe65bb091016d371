//! Sign in with Apple.
//!
//! The controller call is made from the delivery context; its push-style completion reaches the
//! flow through an [`AuthorizationDelegate`] created for this request alone. The request carries
//! a random correlation `state` and the SHA-256 of a raw nonce; the raw nonce travels with the
//! identity token to the backend exchange.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::{self, Identity, RawNonce},
	error::ConfigError,
	flows::Coordinator,
	obs::FlowKind,
	provider::{
		AppleAuthorizationRequest, AuthorizationCredential, AuthorizationDelegate,
		IdentityBackend, PendingAuthorization, PersonName, ProviderKind,
	},
};

impl Coordinator {
	/// Starts an Apple ID authorization scoped to full name and email.
	///
	/// A controller error is forwarded as [`Error::Provider`]. A success callback whose
	/// credential has no usable identity token, echoes a different `state`, or is not an Apple
	/// ID credential at all fails with [`Error::MalformedResponse`]. So does a controller that
	/// drops the delegate without calling it.
	pub fn login_with_apple_id(&self) {
		const KIND: FlowKind = FlowKind::AppleId;
		const STAGE: &str = "login_with_apple_id";

		let Some(controller) = self.apple.clone() else {
			return self.fail_fast(
				KIND,
				STAGE,
				ConfigError::ProviderNotConfigured { provider: ProviderKind::Apple },
			);
		};
		let request = AppleRequestContext::new();
		let (delegate, pending) = AuthorizationDelegate::channel();
		let submitted = request.authorization_request();
		let backend = self.backend.clone();
		let timeout = self.apple_timeout;

		self.context.dispatch(Box::new(move || controller.perform_requests(submitted, delegate)));
		self.spawn_login(KIND, STAGE, request.complete(backend, pending, timeout));
	}
}

/// Per-request values the completion must be checked against.
struct AppleRequestContext {
	state: String,
	nonce: RawNonce,
}
impl AppleRequestContext {
	fn new() -> Self {
		Self { state: auth::correlation_state(), nonce: RawNonce::generate() }
	}

	fn authorization_request(&self) -> AppleAuthorizationRequest {
		AppleAuthorizationRequest::full_name_and_email(self.state.clone(), &self.nonce)
	}

	async fn complete(
		self,
		backend: Arc<dyn IdentityBackend>,
		pending: PendingAuthorization,
		timeout: Option<StdDuration>,
	) -> Result<Identity> {
		let credential = match pending.wait(timeout).await? {
			AuthorizationCredential::AppleId(credential) => credential,
			AuthorizationCredential::Unsupported { kind } => {
				return Err(Error::malformed(
					ProviderKind::Apple,
					format!("unsupported credential type `{kind}`"),
				));
			},
		};
		let federated = credential.into_federated(&self.state, &self.nonce)?;
		let mut identity = backend.sign_in_with_credential(federated).await?;
		// Apple shares name and email on the first authorization only.
		let full_name = credential.full_name.as_ref().and_then(PersonName::formatted);

		identity.backfill_profile(full_name.as_deref(), credential.email.as_deref());

		Ok(identity)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_context_binds_state_and_hashed_nonce() {
		let context = AppleRequestContext::new();
		let request = context.authorization_request();

		assert_eq!(request.state, context.state);
		assert_eq!(request.nonce, context.nonce.sha256());
		assert_ne!(AppleRequestContext::new().state, context.state);
	}
}

//! Federated-identity backend contract shared by every sign-in flow.

// self
use crate::{
	_prelude::*,
	auth::{Identity, RawNonce, Secret},
	provider::{ProviderFuture, ProviderKind},
};

/// Identity backend that turns passwords and provider credentials into identities.
///
/// Implementations own the network protocol; the facade only sees an identity-bearing success
/// or a [`ProviderError`](crate::error::ProviderError). Errors for the password flow should be
/// tagged [`ProviderKind::Password`], errors from a credential exchange with the credential's
/// provider.
pub trait IdentityBackend
where
	Self: Send + Sync,
{
	/// Signs a user in with an identifier (usually an email address) and a secret.
	fn sign_in_with_password<'a>(
		&'a self,
		identifier: &'a str,
		secret: &'a Secret,
	) -> ProviderFuture<'a, Identity>;

	/// Exchanges a federated provider credential for an identity.
	fn sign_in_with_credential(&self, credential: FederatedCredential)
	-> ProviderFuture<'_, Identity>;

	/// Terminates the backend session of the current user.
	fn sign_out(&self) -> ProviderFuture<'_, ()>;
}

/// Provider credential submitted to the federated token exchange.
#[derive(Clone, Debug)]
pub struct FederatedCredential {
	/// Provider that issued the tokens.
	pub provider: ProviderKind,
	/// OpenID identity token.
	pub id_token: Secret,
	/// OAuth access token, when the provider issues one alongside the identity token.
	pub access_token: Option<Secret>,
	/// Raw nonce whose hash was bound into the identity token.
	pub raw_nonce: Option<Secret>,
}
impl FederatedCredential {
	/// Builds an Apple credential from a decoded identity token.
	pub fn apple(id_token: impl Into<Secret>, raw_nonce: Option<&RawNonce>) -> Self {
		Self {
			provider: ProviderKind::Apple,
			id_token: id_token.into(),
			access_token: None,
			raw_nonce: raw_nonce.map(|nonce| Secret::new(nonce.expose())),
		}
	}

	/// Builds a Google credential from an identity token and access token pair.
	pub fn google(id_token: impl Into<Secret>, access_token: impl Into<Secret>) -> Self {
		Self {
			provider: ProviderKind::Google,
			id_token: id_token.into(),
			access_token: Some(access_token.into()),
			raw_nonce: None,
		}
	}

	/// Provider identifier understood by the token exchange (`apple.com`, `google.com`).
	pub fn provider_id(&self) -> &'static str {
		self.provider.federated_id()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credentials_carry_provider_ids_and_redact_tokens() {
		let nonce = RawNonce::generate();
		let apple = FederatedCredential::apple("header.payload.sig", Some(&nonce));

		assert_eq!(apple.provider_id(), "apple.com");
		assert_eq!(apple.raw_nonce.as_ref().map(Secret::expose), Some(nonce.expose()));
		assert!(!format!("{apple:?}").contains("header.payload.sig"));

		let google = FederatedCredential::google("id-token", "access-token");

		assert_eq!(google.provider_id(), "google.com");
		assert_eq!(google.access_token.as_ref().map(Secret::expose), Some("access-token"));
	}
}

//! Google sign-in SDK contract and the presentation anchor hosting its consent screen.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, Secret},
	provider::{FederatedCredential, ProviderFuture, ProviderKind},
};

/// UI surface able to host a provider's consent screen.
pub trait PresentationAnchor
where
	Self: Send + Sync,
{
	/// Returns `true` when the surface is currently attached and visible.
	fn is_displayable(&self) -> bool;
}

/// SDK configuration applied before every sign-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoogleSignInConfig {
	/// OAuth client identifier of the application.
	pub client_id: ClientId,
}

/// Federated Google sign-in SDK.
///
/// Every method is called on the coordinator's delivery context, the thread that owns the UI.
pub trait GoogleSignIn
where
	Self: Send + Sync,
{
	/// Replaces the SDK configuration.
	fn configure(&self, config: GoogleSignInConfig);

	/// Presents the consent flow on `presenting` and resolves with the signed-in user.
	///
	/// The returned future is awaited off the delivery context, so it must not borrow the SDK.
	fn sign_in(
		&self,
		presenting: Arc<dyn PresentationAnchor>,
	) -> ProviderFuture<'static, GoogleUser>;

	/// Forgets the SDK's signed-in user.
	fn sign_out(&self);
}

/// Profile data shared by Google.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GoogleProfile {
	/// Full display name.
	pub name: Option<String>,
	/// Email address.
	pub email: Option<String>,
}

/// User returned by a successful Google sign-in.
#[derive(Clone, Debug, Default)]
pub struct GoogleUser {
	/// Google account identifier.
	pub user_id: Option<String>,
	/// OpenID identity token.
	pub id_token: Option<Secret>,
	/// OAuth access token.
	pub access_token: Option<Secret>,
	/// Basic profile, when the granted scopes include it.
	pub profile: Option<GoogleProfile>,
}
impl GoogleUser {
	/// Extracts the token pair needed by the federated exchange.
	///
	/// Fails with [`Error::MalformedResponse`] when either token is absent or empty.
	pub fn to_credential(&self) -> Result<FederatedCredential> {
		let id_token = usable(self.id_token.as_ref())
			.ok_or_else(|| Error::malformed(ProviderKind::Google, "user is missing the ID token"))?;
		let access_token = usable(self.access_token.as_ref()).ok_or_else(|| {
			Error::malformed(ProviderKind::Google, "user is missing the access token")
		})?;

		Ok(FederatedCredential::google(id_token.clone(), access_token.clone()))
	}
}

fn usable(secret: Option<&Secret>) -> Option<&Secret> {
	secret.filter(|secret| !secret.is_empty())
}

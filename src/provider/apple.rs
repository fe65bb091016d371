//! Sign in with Apple: push-style authorization controller and its single-shot delegate.
//!
//! The platform controller inverts control: the facade submits an
//! [`AppleAuthorizationRequest`] and later receives the outcome through an
//! [`AuthorizationDelegate`] rather than through a returned future. The delegate wraps a
//! one-shot channel, so whichever callback fires first wins and every later fulfillment is
//! ignored. Dropping every delegate clone without completing resolves the request as a
//! malformed response, which keeps the one-result-per-login contract intact.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	auth::{RawNonce, Secret},
	error::ProviderError,
	obs,
	provider::{FederatedCredential, ProviderKind},
};

type AuthorizationOutcome = std::result::Result<AuthorizationCredential, ProviderError>;

/// User data an Apple authorization request may ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppleIdScope {
	/// Given and family name.
	FullName,
	/// Email address (possibly a private relay address).
	Email,
}

/// Authorization request handed to the platform controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppleAuthorizationRequest {
	/// Requested user data.
	pub scopes: Vec<AppleIdScope>,
	/// Correlation value the provider echoes back on the credential.
	pub state: String,
	/// SHA-256 hex digest of the raw nonce, embedded by Apple into the identity token.
	pub nonce: String,
}
impl AppleAuthorizationRequest {
	/// Builds a request scoped to full name and email.
	pub fn full_name_and_email(state: impl Into<String>, nonce: &RawNonce) -> Self {
		Self {
			scopes: vec![AppleIdScope::FullName, AppleIdScope::Email],
			state: state.into(),
			nonce: nonce.sha256(),
		}
	}
}

/// Name components shared on the first authorization only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonName {
	/// Given name.
	pub given_name: Option<String>,
	/// Family name.
	pub family_name: Option<String>,
}
impl PersonName {
	/// Joins the available components with a space.
	pub fn formatted(&self) -> Option<String> {
		let parts = [self.given_name.as_deref(), self.family_name.as_deref()]
			.into_iter()
			.flatten()
			.filter(|part| !part.is_empty())
			.collect::<Vec<_>>();

		if parts.is_empty() { None } else { Some(parts.join(" ")) }
	}
}

/// Credential issued for a successful Apple ID authorization.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AppleIdCredential {
	/// Apple's stable user identifier for this app.
	pub user: String,
	/// Correlation value echoed from the request.
	pub state: Option<String>,
	/// JSON Web Token bytes (UTF-8) asserting the user's identity.
	pub identity_token: Option<Vec<u8>>,
	/// Short-lived authorization code bytes.
	pub authorization_code: Option<Vec<u8>>,
	/// Name components, when the user shared them.
	pub full_name: Option<PersonName>,
	/// Email address, when the user shared it.
	pub email: Option<String>,
}
impl AppleIdCredential {
	/// Validates the credential and converts it into a federated credential.
	///
	/// Fails with [`Error::MalformedResponse`] when the state does not match the request or the
	/// identity token is absent, empty, or not UTF-8.
	pub fn into_federated(
		&self,
		expected_state: &str,
		nonce: &RawNonce,
	) -> Result<FederatedCredential> {
		if self.state.as_deref().is_some_and(|state| state != expected_state) {
			return Err(Error::malformed(
				ProviderKind::Apple,
				"credential state does not match the request",
			));
		}

		let bytes = self.identity_token.as_deref().ok_or_else(|| {
			Error::malformed(ProviderKind::Apple, "credential is missing the identity token")
		})?;
		let token = std::str::from_utf8(bytes).map_err(|_| {
			Error::malformed(ProviderKind::Apple, "identity token is not valid UTF-8")
		})?;

		if token.is_empty() {
			return Err(Error::malformed(ProviderKind::Apple, "identity token is empty"));
		}

		Ok(FederatedCredential::apple(Secret::new(token), Some(nonce)))
	}
}
impl Debug for AppleIdCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppleIdCredential")
			.field("user", &self.user)
			.field("state", &self.state)
			.field("identity_token_set", &self.identity_token.is_some())
			.field("authorization_code_set", &self.authorization_code.is_some())
			.field("full_name", &self.full_name)
			.field("email", &self.email)
			.finish()
	}
}

/// Credential variants an authorization controller may return.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationCredential {
	/// Apple ID credential carrying an identity token.
	AppleId(AppleIdCredential),
	/// Any other credential type (e.g. a stored keychain password) the facade cannot exchange.
	Unsupported {
		/// Platform name of the credential type.
		kind: String,
	},
}

/// Platform authorization controller that performs Apple ID requests.
pub trait AppleAuthorizationController
where
	Self: Send + Sync,
{
	/// Submits the request; the outcome must be reported through `delegate` exactly once.
	///
	/// Implementations may complete synchronously or keep the delegate and complete later from
	/// any thread.
	fn perform_requests(&self, request: AppleAuthorizationRequest, delegate: AuthorizationDelegate);
}

/// Single-shot completion handle handed to the authorization controller.
#[derive(Clone)]
pub struct AuthorizationDelegate {
	sender: Arc<Mutex<Option<oneshot::Sender<AuthorizationOutcome>>>>,
}
impl AuthorizationDelegate {
	/// Creates a delegate and the receiver that observes its first fulfillment.
	pub fn channel() -> (Self, PendingAuthorization) {
		let (tx, rx) = oneshot::channel();

		(Self { sender: Arc::new(Mutex::new(Some(tx))) }, PendingAuthorization(rx))
	}

	/// Reports a successful authorization. Returns `false` if the request already completed.
	pub fn did_complete_with_authorization(&self, credential: AuthorizationCredential) -> bool {
		self.fulfill(Ok(credential))
	}

	/// Reports a failed authorization. Returns `false` if the request already completed.
	pub fn did_complete_with_error(&self, error: ProviderError) -> bool {
		self.fulfill(Err(error))
	}

	/// Returns `true` once either completion callback has fired.
	pub fn is_completed(&self) -> bool {
		self.sender.lock().is_none()
	}

	fn fulfill(&self, outcome: AuthorizationOutcome) -> bool {
		let Some(sender) = self.sender.lock().take() else {
			obs::flow_event!(warn, "Ignoring a second completion for an Apple authorization.");

			return false;
		};

		// The waiting flow may have timed out; the outcome is dropped then.
		let _ = sender.send(outcome);

		true
	}
}
impl Debug for AuthorizationDelegate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationDelegate").field("completed", &self.is_completed()).finish()
	}
}

/// Receiving side of an [`AuthorizationDelegate`].
#[derive(Debug)]
pub struct PendingAuthorization(oneshot::Receiver<AuthorizationOutcome>);
impl PendingAuthorization {
	/// Waits for the delegate's first fulfillment, optionally bounded by `timeout`.
	pub async fn wait(self, timeout: Option<StdDuration>) -> Result<AuthorizationCredential> {
		let received = match timeout {
			Some(limit) => tokio::time::timeout(limit, self.0).await.map_err(|_| {
				ProviderError::new(ProviderKind::Apple, ProviderError::AUTHORIZATION_TIMEOUT)
					.with_message(format!("no completion within {}ms", limit.as_millis()))
			})?,
			None => self.0.await,
		};

		match received {
			Ok(outcome) => Ok(outcome?),
			Err(_) => Err(Error::malformed(
				ProviderKind::Apple,
				"authorization controller released the request without completing it",
			)),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn credential(token: Option<&[u8]>, state: Option<&str>) -> AppleIdCredential {
		AppleIdCredential {
			user: "000123.abc".into(),
			state: state.map(str::to_owned),
			identity_token: token.map(<[u8]>::to_vec),
			..Default::default()
		}
	}

	#[test]
	fn request_hashes_nonce_and_scopes_name_and_email() {
		let nonce = RawNonce::generate();
		let request = AppleAuthorizationRequest::full_name_and_email("state-1", &nonce);

		assert_eq!(request.scopes, [AppleIdScope::FullName, AppleIdScope::Email]);
		assert_eq!(request.nonce, nonce.sha256());
		assert_ne!(request.nonce, nonce.expose());
	}

	#[test]
	fn credential_conversion_rejects_unusable_tokens() {
		let nonce = RawNonce::generate();
		let missing = credential(None, Some("s")).into_federated("s", &nonce);

		assert!(matches!(
			missing,
			Err(Error::MalformedResponse { provider: ProviderKind::Apple, .. })
		));

		let invalid = credential(Some(&[0xff, 0xfe]), None).into_federated("s", &nonce);

		assert!(matches!(invalid, Err(Error::MalformedResponse { .. })));

		let mismatch = credential(Some(b"jwt"), Some("other")).into_federated("s", &nonce);

		assert!(matches!(mismatch, Err(Error::MalformedResponse { .. })));

		let ok = credential(Some(b"jwt"), Some("s"))
			.into_federated("s", &nonce)
			.expect("A complete credential should convert.");

		assert_eq!(ok.id_token.expose(), "jwt");
		assert_eq!(ok.provider_id(), "apple.com");
	}

	#[test]
	fn person_name_formats_available_parts() {
		let name = PersonName { given_name: Some("Ada".into()), family_name: None };

		assert_eq!(name.formatted().as_deref(), Some("Ada"));
		assert_eq!(PersonName::default().formatted(), None);
	}

	#[tokio::test]
	async fn delegate_fulfills_once() {
		let (delegate, pending) = AuthorizationDelegate::channel();
		let twin = delegate.clone();

		assert!(delegate.did_complete_with_error(ProviderError::new(ProviderKind::Apple, "1001")));
		assert!(!twin.did_complete_with_authorization(AuthorizationCredential::AppleId(
			credential(Some(b"jwt"), None)
		)));
		assert!(twin.is_completed());

		let err = pending.wait(None).await.expect_err("The first completion was an error.");

		assert_eq!(err.provider_code(), Some("1001"));
	}

	#[tokio::test]
	async fn dropped_delegate_resolves_as_malformed() {
		let (delegate, pending) = AuthorizationDelegate::channel();

		drop(delegate);

		let err = pending.wait(None).await.expect_err("A dropped delegate must not hang.");

		assert!(matches!(err, Error::MalformedResponse { .. }));
	}

	#[tokio::test]
	async fn wait_times_out() {
		let (_delegate, pending) = AuthorizationDelegate::channel();
		let err = pending
			.wait(Some(StdDuration::from_millis(10)))
			.await
			.expect_err("An unanswered request should time out.");

		assert_eq!(err.provider_code(), Some(ProviderError::AUTHORIZATION_TIMEOUT));
	}
}

//! Provider-facing contracts (traits) and the data they exchange with the facade.
//!
//! `backend` defines [`IdentityBackend`], the federated-identity service that signs users in with
//! a password or a provider credential. `apple` models the push-style authorization controller
//! and its single-shot delegate, `google` the federated sign-in SDK and its presentation anchor.
//! With the `reqwest` feature, `identity_toolkit` offers a REST implementation of the backend.

pub mod apple;
pub mod backend;
pub mod google;
#[cfg(feature = "reqwest")] pub mod identity_toolkit;

pub use apple::*;
pub use backend::*;
pub use google::*;
#[cfg(feature = "reqwest")] pub use identity_toolkit::*;

// self
use crate::{_prelude::*, error::ProviderError};

/// Boxed future returned by provider hooks.
pub type ProviderFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, ProviderError>> + 'a + Send>>;

/// Identity providers the facade can sign users in with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
	/// Identifier + secret against the identity backend.
	Password,
	/// Sign in with Apple.
	Apple,
	/// Google sign-in.
	Google,
}
impl ProviderKind {
	/// Returns a stable label suitable for logs and error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::Password => "password",
			ProviderKind::Apple => "apple",
			ProviderKind::Google => "google",
		}
	}

	/// Provider identifier understood by the federated token exchange.
	pub const fn federated_id(self) -> &'static str {
		match self {
			ProviderKind::Password => "password",
			ProviderKind::Apple => "apple.com",
			ProviderKind::Google => "google.com",
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

//! Facade-level error types surfaced to observers through `on_authentication_failed`.

// std
use std::path::PathBuf;
// self
use crate::{_prelude::*, auth::IdentifierError, provider::ProviderKind};

/// Facade-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical failure reason delivered to observers.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The identity provider rejected the request or the transport failed.
	#[error(transparent)]
	Provider(#[from] ProviderError),
	/// The provider reported success but the payload lacked the fields needed for an identity.
	#[error("{provider} returned a malformed response: {reason}.")]
	MalformedResponse {
		/// Provider whose payload was unusable.
		provider: ProviderKind,
		/// Short description of the missing or invalid field.
		reason: String,
	},
	/// Required process-wide configuration is absent or invalid.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The sign-out call itself failed.
	#[error("Sign-out failed: {0}")]
	SignOut(#[source] ProviderError),
	/// Caller-supplied input was rejected before any provider call.
	#[error("The `{field}` argument must not be empty.")]
	InvalidInput {
		/// Name of the offending argument.
		field: &'static str,
	},
}
impl Error {
	/// Builds a [`Error::MalformedResponse`] for the given provider.
	pub fn malformed(provider: ProviderKind, reason: impl Into<String>) -> Self {
		Self::MalformedResponse { provider, reason: reason.into() }
	}

	/// Returns the provider error code when the failure originated from a provider call.
	pub fn provider_code(&self) -> Option<&str> {
		match self {
			Self::Provider(err) | Self::SignOut(err) => Some(err.code()),
			_ => None,
		}
	}
}

/// Configuration failures detected before any provider call is made.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No Google client identifier is configured.
	#[error("No client identifier is configured for Google sign-in.")]
	MissingClientId,
	/// No API key is configured for the identity backend.
	#[error("No API key is configured for the identity backend.")]
	MissingApiKey,
	/// The coordinator was built without an adapter for the requested provider.
	#[error("No {provider} adapter is configured on the coordinator.")]
	ProviderNotConfigured {
		/// Provider that has no adapter.
		provider: ProviderKind,
	},
	/// The supplied presentation context cannot currently host UI.
	#[error("The presentation context is not currently displayable.")]
	PresentationUnavailable,
	/// No tokio runtime was available when the coordinator was built.
	#[error("A tokio runtime is required to drive provider flows.")]
	RuntimeUnavailable,
	/// Options file could not be read.
	#[error("Unable to read app options from {}.", .path.display())]
	OptionsRead {
		/// Options file location.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Options payload could not be parsed.
	#[error("App options are malformed.")]
	OptionsParse {
		/// Structured parsing failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A configured identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Error reported by an identity provider, kept intact for observer inspection.
#[derive(Debug, ThisError)]
#[error("{provider} error {code}{}", detail(.message))]
pub struct ProviderError {
	provider: ProviderKind,
	code: String,
	message: Option<String>,
	#[source]
	source: Option<BoxError>,
}
impl ProviderError {
	/// Code attached to transport failures.
	pub const NETWORK_ERROR: &'static str = "NETWORK_ERROR";
	/// Code attached to success payloads that could not be parsed.
	pub const INVALID_RESPONSE: &'static str = "INVALID_RESPONSE";
	/// Code attached to push-style authorizations that never completed in time.
	pub const AUTHORIZATION_TIMEOUT: &'static str = "AUTHORIZATION_TIMEOUT";
	/// Code attached to flows whose provider call panicked before producing an outcome.
	pub const PROVIDER_PANICKED: &'static str = "PROVIDER_PANICKED";

	/// Creates a provider error carrying the provider's own error code.
	pub fn new(provider: ProviderKind, code: impl Into<String>) -> Self {
		Self { provider, code: code.into(), message: None, source: None }
	}

	/// Wraps a transport failure under [`ProviderError::NETWORK_ERROR`].
	pub fn network(
		provider: ProviderKind,
		source: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::new(provider, Self::NETWORK_ERROR).with_source(source)
	}

	/// Attaches a human-readable message.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());

		self
	}

	/// Attaches the underlying error.
	pub fn with_source(mut self, source: impl 'static + Send + Sync + std::error::Error) -> Self {
		self.source = Some(Box::new(source));

		self
	}

	/// Provider that produced the error.
	pub fn provider(&self) -> ProviderKind {
		self.provider
	}

	/// Provider-defined error code, e.g. `INVALID_CREDENTIAL`.
	pub fn code(&self) -> &str {
		&self.code
	}

	/// Optional detail message.
	pub fn message(&self) -> Option<&str> {
		self.message.as_deref()
	}
}

fn detail(message: &Option<String>) -> String {
	message.as_deref().map(|message| format!(": {message}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn provider_error_display_includes_code_and_message() {
		let bare = ProviderError::new(ProviderKind::Password, "INVALID_CREDENTIAL");

		assert_eq!(bare.to_string(), "password error INVALID_CREDENTIAL");

		let detailed = ProviderError::new(ProviderKind::Google, "USER_DISABLED")
			.with_message("account suspended");

		assert_eq!(detailed.to_string(), "google error USER_DISABLED: account suspended");
	}

	#[test]
	fn sign_out_error_exposes_provider_error_as_source() {
		let io = std::io::Error::other("keychain locked");
		let err = Error::SignOut(
			ProviderError::new(ProviderKind::Password, "KEYCHAIN_ERROR").with_source(io),
		);

		assert_eq!(err.provider_code(), Some("KEYCHAIN_ERROR"));

		let source = StdError::source(&err).expect("Sign-out error should expose its cause.");

		assert!(source.to_string().contains("KEYCHAIN_ERROR"));
		assert!(StdError::source(source).is_some());
	}

	#[test]
	fn config_errors_have_no_provider_code() {
		let err: Error = ConfigError::MissingClientId.into();

		assert!(err.provider_code().is_none());
		assert!(matches!(err, Error::Config(ConfigError::MissingClientId)));
	}
}

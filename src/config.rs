//! Process-wide application options, resolved at call time.
//!
//! Flows never cache options: every Google sign-in asks its [`OptionsSource`] again, so a host
//! that rewrites its options file or environment between attempts is picked up immediately.

// std
use std::path::{Path, PathBuf};
// self
use crate::{_prelude::*, auth::ClientId, error::ConfigError};

/// Application options shared by the providers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppOptions {
	/// OAuth client identifier used by Google sign-in.
	#[serde(default)]
	pub client_id: Option<String>,
	/// API key for the identity backend.
	#[serde(default)]
	pub api_key: Option<String>,
	/// Project identifier of the identity backend.
	#[serde(default)]
	pub project_id: Option<String>,
	/// Alternate identity backend endpoint, e.g. a local emulator.
	#[serde(default)]
	pub identity_toolkit_endpoint: Option<Url>,
}
impl AppOptions {
	/// Sets the Google client identifier.
	pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the identity backend API key.
	pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
		self.api_key = Some(api_key.into());

		self
	}

	/// Returns the validated Google client identifier.
	///
	/// A missing or blank value is reported as [`ConfigError::MissingClientId`].
	pub fn google_client_id(&self) -> Result<ClientId, ConfigError> {
		let raw = self
			.client_id
			.as_deref()
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.ok_or(ConfigError::MissingClientId)?;

		Ok(ClientId::new(raw)?)
	}
}

/// Source of [`AppOptions`], consulted on every use.
pub trait OptionsSource
where
	Self: Send + Sync,
{
	/// Resolves the current options.
	fn options(&self) -> Result<AppOptions, ConfigError>;
}

/// In-memory options that the host may replace at runtime.
#[derive(Debug, Default)]
pub struct StaticOptions(RwLock<AppOptions>);
impl StaticOptions {
	/// Wraps the provided options.
	pub fn new(options: AppOptions) -> Self {
		Self(RwLock::new(options))
	}

	/// Replaces the stored options.
	pub fn replace(&self, options: AppOptions) {
		*self.0.write() = options;
	}
}
impl OptionsSource for StaticOptions {
	fn options(&self) -> Result<AppOptions, ConfigError> {
		Ok(self.0.read().clone())
	}
}

/// Options stored as a JSON document on disk, re-read on every call.
#[derive(Clone, Debug)]
pub struct JsonFileOptions {
	path: PathBuf,
}
impl JsonFileOptions {
	/// Points the source at `path`.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Location of the options document.
	pub fn path(&self) -> &Path {
		&self.path
	}
}
impl OptionsSource for JsonFileOptions {
	fn options(&self) -> Result<AppOptions, ConfigError> {
		let raw = std::fs::read(&self.path)
			.map_err(|source| ConfigError::OptionsRead { path: self.path.clone(), source })?;

		parse_options(&raw)
	}
}

/// Options read from `{PREFIX}_CLIENT_ID`, `{PREFIX}_API_KEY`, `{PREFIX}_PROJECT_ID`, and
/// `{PREFIX}_IDENTITY_TOOLKIT_ENDPOINT` on every call.
#[derive(Clone, Debug)]
pub struct EnvOptions {
	prefix: String,
}
impl EnvOptions {
	/// Prefix used by [`EnvOptions::default`].
	pub const DEFAULT_PREFIX: &'static str = "AUTHN_FACADE";

	/// Reads variables under the given prefix.
	pub fn new(prefix: impl Into<String>) -> Self {
		Self { prefix: prefix.into() }
	}

	fn var(&self, name: &str) -> Option<String> {
		std::env::var(format!("{}_{name}", self.prefix)).ok().filter(|value| !value.is_empty())
	}
}
impl Default for EnvOptions {
	fn default() -> Self {
		Self::new(Self::DEFAULT_PREFIX)
	}
}
impl OptionsSource for EnvOptions {
	fn options(&self) -> Result<AppOptions, ConfigError> {
		let identity_toolkit_endpoint = match self.var("IDENTITY_TOOLKIT_ENDPOINT") {
			Some(raw) => {
				let payload = serde_json::Value::String(raw);

				Some(
					serde_path_to_error::deserialize(payload)
						.map_err(|source| ConfigError::OptionsParse { source })?,
				)
			},
			None => None,
		};

		Ok(AppOptions {
			client_id: self.var("CLIENT_ID"),
			api_key: self.var("API_KEY"),
			project_id: self.var("PROJECT_ID"),
			identity_toolkit_endpoint,
		})
	}
}

/// Parses a JSON options document, reporting the failing field path on error.
pub fn parse_options(raw: &[u8]) -> Result<AppOptions, ConfigError> {
	let mut deserializer = serde_json::Deserializer::from_slice(raw);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ConfigError::OptionsParse { source })
}

//! Provider-agnostic identity handle and the unified authentication result.

// self
use crate::{_prelude::*, auth::UserId, provider::ProviderKind};

/// Opaque handle describing an authenticated principal.
///
/// The facade never interprets these fields; it carries whatever the identity backend resolved
/// through to the observer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Stable user identifier assigned by the identity backend.
	pub user_id: UserId,
	/// Display name, when the provider shared one.
	pub display_name: Option<String>,
	/// Email address, when the provider shared one.
	pub email: Option<String>,
	/// Provider that authenticated the user.
	pub provider: ProviderKind,
	/// Instant the backend confirmed the sign-in.
	#[serde(with = "time::serde::rfc3339")]
	pub authenticated_at: OffsetDateTime,
}
impl Identity {
	/// Creates an identity with no profile fields, stamped with the current time.
	pub fn new(user_id: UserId, provider: ProviderKind) -> Self {
		Self {
			user_id,
			display_name: None,
			email: None,
			provider,
			authenticated_at: OffsetDateTime::now_utc(),
		}
	}

	/// Sets the display name.
	pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
		self.display_name = Some(display_name.into());

		self
	}

	/// Sets the email address.
	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}

	/// Fills profile fields the backend left empty from provider-supplied values.
	pub(crate) fn backfill_profile(&mut self, display_name: Option<&str>, email: Option<&str>) {
		if self.display_name.is_none() {
			self.display_name = display_name.filter(|v| !v.is_empty()).map(str::to_owned);
		}
		if self.email.is_none() {
			self.email = email.filter(|v| !v.is_empty()).map(str::to_owned);
		}
	}
}

/// Terminal outcome of a single login invocation.
#[derive(Debug)]
pub enum AuthenticationResult {
	/// The provider authenticated the user.
	Success(Identity),
	/// The provider, configuration, or input rejected the attempt.
	Failure(Error),
}
impl AuthenticationResult {
	/// Returns `true` for [`AuthenticationResult::Success`].
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}

	/// Converts the result into a standard [`Result`].
	pub fn into_result(self) -> Result<Identity> {
		match self {
			Self::Success(identity) => Ok(identity),
			Self::Failure(err) => Err(err),
		}
	}
}
impl From<Result<Identity>> for AuthenticationResult {
	fn from(value: Result<Identity>) -> Self {
		match value {
			Ok(identity) => Self::Success(identity),
			Err(err) => Self::Failure(err),
		}
	}
}

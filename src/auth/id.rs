//! Identifiers shared by identities and provider configuration.
//!
//! [`UserId`] is whatever the identity backend returned; it is only required to be non-empty.
//! [`ClientId`] is configured by the host, so it is checked before it reaches an SDK.

// self
use crate::_prelude::*;

/// Error returned when an identifier cannot be accepted.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The backend returned an empty user identifier.
	#[error("User identifier cannot be empty.")]
	EmptyUserId,
	/// The configured client identifier was empty after trimming.
	#[error("Client identifier cannot be empty.")]
	EmptyClientId,
	/// The configured client identifier contains a character an OAuth client id never has.
	#[error("Client identifier contains {found:?} at byte {index}.")]
	InvalidClientIdCharacter {
		/// Offending character.
		found: char,
		/// Byte offset of the character.
		index: usize,
	},
}

/// Stable identifier of an authenticated user, as issued by the identity backend.
///
/// The value is opaque: nothing in the facade parses or reshapes it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);
impl UserId {
	/// Wraps a backend-issued identifier, rejecting only the empty string.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		let value = value.into();

		if value.is_empty() {
			return Err(IdentifierError::EmptyUserId);
		}

		Ok(Self(value))
	}

	/// Borrows the raw identifier.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl TryFrom<String> for UserId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<UserId> for String {
	fn from(value: UserId) -> Self {
		value.0
	}
}
impl AsRef<str> for UserId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "UserId({})", self.0)
	}
}
impl Display for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// OAuth client identifier handed to a federated sign-in SDK,
/// e.g. `1234-abc.apps.googleusercontent.com`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientId(String);
impl ClientId {
	/// Trims `value` and accepts it when it is non-empty printable ASCII without spaces.
	pub fn new(value: &str) -> Result<Self, IdentifierError> {
		let trimmed = value.trim();

		if trimmed.is_empty() {
			return Err(IdentifierError::EmptyClientId);
		}
		if let Some((index, found)) = trimmed.char_indices().find(|(_, c)| !c.is_ascii_graphic()) {
			return Err(IdentifierError::InvalidClientIdCharacter { found, index });
		}

		Ok(Self(trimmed.to_owned()))
	}

	/// Borrows the raw identifier.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl FromStr for ClientId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for ClientId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ClientId({})", self.0)
	}
}
impl Display for ClientId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

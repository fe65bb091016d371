//! Request nonces and correlation values for push-style authorizations.

// crates.io
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const NONCE_LEN: usize = 32;
const STATE_LEN: usize = 32;

/// Single-use nonce binding a push-style authorization to the later credential exchange.
///
/// The hashed form travels with the authorization request; the raw form accompanies the
/// resulting identity token so the backend can match the two.
#[derive(Clone, PartialEq, Eq)]
pub struct RawNonce(String);
impl RawNonce {
	/// Generates a fresh random nonce.
	pub fn generate() -> Self {
		Self(random_string(NONCE_LEN))
	}

	/// Raw value handed to the identity backend.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Lowercase hex SHA-256 digest placed on the authorization request.
	pub fn sha256(&self) -> String {
		let digest = Sha256::digest(self.0.as_bytes());

		format!("{digest:x}")
	}
}
impl Debug for RawNonce {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RawNonce(..)")
	}
}

/// Generates the opaque correlation value echoed back by push-style providers.
pub fn correlation_state() -> String {
	random_string(STATE_LEN)
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn hashed_nonce_is_hex_sha256() {
		let nonce = RawNonce("abc".into());

		assert_eq!(
			nonce.sha256(),
			"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
		);
	}

	#[test]
	fn generated_values_are_unique_and_sized() {
		let a = RawNonce::generate();
		let b = RawNonce::generate();

		assert_eq!(a.expose().len(), NONCE_LEN);
		assert_ne!(a, b);
		assert_eq!(correlation_state().len(), STATE_LEN);
		assert_eq!(format!("{a:?}"), "RawNonce(..)");
	}
}

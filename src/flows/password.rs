//! Identifier + secret login.

// self
use crate::{_prelude::*, auth::Secret, flows::Coordinator, obs::FlowKind};

impl Coordinator {
	/// Signs a user in with an identifier and secret through the identity backend.
	///
	/// Empty arguments fail with [`Error::InvalidInput`] without contacting the backend. Any
	/// backend failure (wrong secret, unknown user, transport) is forwarded as
	/// [`Error::Provider`] unchanged.
	pub fn login_with_password(&self, identifier: impl Into<String>, secret: impl Into<Secret>) {
		const KIND: FlowKind = FlowKind::Password;
		const STAGE: &str = "login_with_password";

		let identifier = identifier.into();
		let secret = secret.into();

		if let Err(err) = validate_input(&identifier, &secret) {
			return self.fail_fast(KIND, STAGE, err);
		}

		let backend = self.backend.clone();

		self.spawn_login(KIND, STAGE, async move {
			backend.sign_in_with_password(&identifier, &secret).await.map_err(Error::from)
		});
	}
}

fn validate_input(identifier: &str, secret: &Secret) -> Result<()> {
	if identifier.is_empty() {
		return Err(Error::InvalidInput { field: "identifier" });
	}
	if secret.is_empty() {
		return Err(Error::InvalidInput { field: "secret" });
	}

	Ok(())
}

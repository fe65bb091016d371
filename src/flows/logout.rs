//! Sign-out.

// self
use crate::{
	_prelude::*,
	auth::AuthenticationResult,
	flows::Coordinator,
	obs::FlowKind,
};

impl Coordinator {
	/// Ends the backend session and forgets the Google SDK user, if Google is configured.
	///
	/// The Google SDK is signed out on the delivery context. Success is silent. A failing backend
	/// sign-out reaches the observer as [`Error::SignOut`].
	pub fn logout(&self) {
		let backend = self.backend.clone();

		if let Some(google) = self.google.clone() {
			self.context.dispatch(Box::new(move || google.sign_out()));
		}

		self.spawn_flow(FlowKind::Logout, "logout", async move {
			backend
				.sign_out()
				.await
				.err()
				.map(|err| AuthenticationResult::Failure(Error::SignOut(err)))
		});
	}
}

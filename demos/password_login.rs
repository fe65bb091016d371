//! Demonstrates a password login against a mocked Identity Toolkit endpoint, with the outcome
//! pulled from a channel observer.

// std
use std::sync::Arc;
// crates.io
use color_eyre::{Result, eyre::eyre};
use httpmock::prelude::*;
// self
use authn_facade::{
	auth::AuthenticationResult,
	flows::Coordinator,
	observer::ChannelObserver,
	provider::IdentityToolkitClient,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let sign_in = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/accounts:signInWithPassword")
				.query_param("key", "demo-key");
			then.status(200).header("content-type", "application/json").body(
				"{\"localId\":\"demo-user\",\"email\":\"ada@example.com\",\"displayName\":\"Ada\"}",
			);
		})
		.await;
	let backend =
		IdentityToolkitClient::new("demo-key")?.with_endpoint(Url::parse(&server.base_url())?);
	let coordinator = Coordinator::builder(Arc::new(backend)).build()?;
	let (observer, mut results) = ChannelObserver::new();

	coordinator.register_observer(Arc::new(observer));
	coordinator.login_with_password("ada@example.com", "correct horse battery staple");

	match results.recv().await.ok_or_else(|| eyre!("The observer channel closed early."))? {
		AuthenticationResult::Success(identity) => println!(
			"Signed in {} ({}) via {}.",
			identity.user_id,
			identity.display_name.as_deref().unwrap_or("anonymous"),
			identity.provider,
		),
		AuthenticationResult::Failure(err) => println!("Sign-in failed: {err}."),
	}

	sign_in.assert_async().await;

	Ok(())
}

//! Reqwest-backed [`IdentityBackend`] speaking the Identity Toolkit REST protocol.
//!
//! Password sign-ins call `accounts:signInWithPassword`; federated credentials are exchanged via
//! `accounts:signInWithIdp`. Error payloads of the form
//! `{"error":{"code":400,"message":"CODE : detail"}}` become [`ProviderError`]s whose code is the
//! leading `CODE`, transport failures become `NETWORK_ERROR`, and success payloads that cannot be
//! parsed become `INVALID_RESPONSE` with the offending JSON path in the message. The client keeps
//! the signed-in user id in memory only; [`IdentityBackend::sign_out`] forgets it.

// crates.io
use serde::de::DeserializeOwned;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{Identity, Secret, UserId},
	config::AppOptions,
	error::{ConfigError, ProviderError},
	provider::{FederatedCredential, IdentityBackend, ProviderFuture, ProviderKind},
};

const DEFAULT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/";
const IDP_REQUEST_URI: &str = "http://localhost";
const BODY_PREVIEW_LIMIT: usize = 256;

/// Identity backend client for Identity Toolkit compatible services.
pub struct IdentityToolkitClient {
	http: ReqwestClient,
	endpoint: Option<Url>,
	api_key: Secret,
	signed_in: Mutex<Option<UserId>>,
}
impl IdentityToolkitClient {
	/// Creates a client for the public endpoint using a default reqwest client.
	pub fn new(api_key: impl Into<Secret>) -> Result<Self, ConfigError> {
		let http = ReqwestClient::builder().build()?;

		Ok(Self::with_client(http, api_key))
	}

	/// Wraps an existing reqwest client.
	pub fn with_client(http: ReqwestClient, api_key: impl Into<Secret>) -> Self {
		Self { http, endpoint: None, api_key: api_key.into(), signed_in: Mutex::new(None) }
	}

	/// Builds a client from app options; an API key is required.
	pub fn from_options(options: &AppOptions) -> Result<Self, ConfigError> {
		let api_key = options
			.api_key
			.as_deref()
			.filter(|key| !key.trim().is_empty())
			.ok_or(ConfigError::MissingApiKey)?;
		let client = Self::new(api_key)?;

		Ok(match &options.identity_toolkit_endpoint {
			Some(endpoint) => client.with_endpoint(endpoint.clone()),
			None => client,
		})
	}

	/// Overrides the service endpoint (e.g. an emulator). A trailing slash is appended if missing.
	pub fn with_endpoint(mut self, mut endpoint: Url) -> Self {
		if !endpoint.path().ends_with('/') {
			let path = format!("{}/", endpoint.path());

			endpoint.set_path(&path);
		}

		self.endpoint = Some(endpoint);

		self
	}

	/// User id of the last successful sign-in, until [`IdentityBackend::sign_out`] is called.
	pub fn signed_in_user(&self) -> Option<UserId> {
		self.signed_in.lock().clone()
	}

	fn method_url(&self, provider: ProviderKind, method: &str) -> Result<Url, ProviderError> {
		let invalid =
			|e: url::ParseError| ProviderError::new(provider, "INVALID_ENDPOINT").with_source(e);
		let mut url = match &self.endpoint {
			Some(endpoint) => endpoint.join(&format!("v1/accounts:{method}")),
			None => Url::parse(DEFAULT_ENDPOINT)
				.and_then(|endpoint| endpoint.join(&format!("v1/accounts:{method}"))),
		}
		.map_err(invalid)?;

		url.query_pairs_mut().append_pair("key", self.api_key.expose());

		Ok(url)
	}

	async fn post<B, T>(
		&self,
		provider: ProviderKind,
		method: &str,
		body: &B,
	) -> Result<T, ProviderError>
	where
		B: Serialize + ?Sized,
		T: DeserializeOwned,
	{
		let url = self.method_url(provider, method)?;
		let response = self
			.http
			.post(url)
			.json(body)
			.send()
			.await
			.map_err(|e| ProviderError::network(provider, e))?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(|e| ProviderError::network(provider, e))?;

		if !status.is_success() {
			return Err(map_error_body(provider, status.as_u16(), &bytes));
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
			ProviderError::new(provider, ProviderError::INVALID_RESPONSE)
				.with_message(format!("unexpected payload at `{}`", e.path()))
				.with_source(e)
		})
	}

	fn finish_sign_in(
		&self,
		provider: ProviderKind,
		payload: SignInPayload,
	) -> Result<Identity, ProviderError> {
		let user_id = UserId::new(payload.local_id).map_err(|e| {
			ProviderError::new(provider, ProviderError::INVALID_RESPONSE)
				.with_message("localId is empty")
				.with_source(e)
		})?;
		let mut identity = Identity::new(user_id.clone(), provider);

		identity.display_name = payload.display_name.filter(|name| !name.is_empty());
		identity.email = payload.email.filter(|email| !email.is_empty());
		*self.signed_in.lock() = Some(user_id);

		Ok(identity)
	}
}
impl IdentityBackend for IdentityToolkitClient {
	fn sign_in_with_password<'a>(
		&'a self,
		identifier: &'a str,
		secret: &'a Secret,
	) -> ProviderFuture<'a, Identity> {
		Box::pin(async move {
			const KIND: ProviderKind = ProviderKind::Password;

			let body = PasswordRequest {
				email: identifier,
				password: secret.expose(),
				return_secure_token: true,
			};
			let payload = self.post(KIND, "signInWithPassword", &body).await?;

			self.finish_sign_in(KIND, payload)
		})
	}

	fn sign_in_with_credential(
		&self,
		credential: FederatedCredential,
	) -> ProviderFuture<'_, Identity> {
		Box::pin(async move {
			let kind = credential.provider;
			let body = IdpRequest {
				post_body: idp_post_body(&credential),
				request_uri: IDP_REQUEST_URI,
				return_secure_token: true,
				return_idp_credential: true,
			};
			let payload = self.post(kind, "signInWithIdp", &body).await?;

			self.finish_sign_in(kind, payload)
		})
	}

	fn sign_out(&self) -> ProviderFuture<'_, ()> {
		Box::pin(async move {
			self.signed_in.lock().take();

			Ok::<_, ProviderError>(())
		})
	}
}
impl Debug for IdentityToolkitClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdentityToolkitClient")
			.field("endpoint", &self.endpoint.as_ref().map_or(DEFAULT_ENDPOINT, Url::as_str))
			.field("api_key", &self.api_key)
			.finish()
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
	email: &'a str,
	password: &'a str,
	return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
	post_body: String,
	request_uri: &'a str,
	return_secure_token: bool,
	return_idp_credential: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInPayload {
	local_id: String,
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	display_name: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
	error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
	message: String,
}

fn idp_post_body(credential: &FederatedCredential) -> String {
	let mut body = form_urlencoded::Serializer::new(String::new());

	body.append_pair("id_token", credential.id_token.expose());
	body.append_pair("providerId", credential.provider_id());

	if let Some(access_token) = &credential.access_token {
		body.append_pair("access_token", access_token.expose());
	}
	if let Some(nonce) = &credential.raw_nonce {
		body.append_pair("nonce", nonce.expose());
	}

	body.finish()
}

fn map_error_body(provider: ProviderKind, status: u16, body: &[u8]) -> ProviderError {
	match serde_json::from_slice::<ErrorEnvelope>(body) {
		Ok(envelope) => {
			let raw = envelope.error.message;
			let (code, detail) = match raw.split_once(" : ") {
				Some((code, detail)) => (code.trim().to_owned(), Some(detail.trim().to_owned())),
				None => (raw.trim().to_owned(), None),
			};
			let err = ProviderError::new(provider, code);

			match detail {
				Some(detail) => err.with_message(detail),
				None => err,
			}
		},
		Err(_) => ProviderError::new(provider, format!("HTTP_{status}"))
			.with_message(body_preview(body)),
	}
}

fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

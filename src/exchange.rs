//! Client-credentials exchange against the provider's identity endpoint.
//!
//! [`CredentialExchanger::authenticate`] performs exactly one POST per call: Basic client
//! authentication, the provider API key header, and the fixed `grant_type=client_credentials`
//! form body. There is no retry and no caching; every failure surfaces as [`AuthError`].

// crates.io
use reqwest::Method;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials},
	error::AuthError,
	http::{HttpRequest, HttpResponse, HttpTransport, ReqwestHttpClient},
	obs::{self, Step},
	provider::{ProviderDescriptor, RejectionContext, classify_rejection},
};

/// Grant type sent in every token request.
pub const GRANT_TYPE: &str = "client_credentials";

/// Converts a [`Credentials`] triple into a bearer [`AccessToken`].
#[derive(Clone)]
pub struct CredentialExchanger<C = ReqwestHttpClient>
where
	C: ?Sized + HttpTransport,
{
	/// HTTP client wrapper used for the token request.
	pub http_client: Arc<C>,
	/// Provider descriptor that defines the token endpoint and API key header.
	pub descriptor: ProviderDescriptor,
}
impl<C> CredentialExchanger<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates an exchanger that reuses the caller-provided transport.
	pub fn with_http_client(descriptor: ProviderDescriptor, http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into(), descriptor }
	}

	/// Builds the token request without sending it.
	pub fn token_request(&self, credentials: &Credentials) -> HttpRequest {
		let body = form_urlencoded::Serializer::new(String::new())
			.append_pair("grant_type", GRANT_TYPE)
			.finish();

		HttpRequest::new(Method::POST, self.descriptor.token_endpoint.clone())
			.with_header("authorization", credentials.basic_authorization())
			.with_header("content-type", "application/x-www-form-urlencoded")
			.with_header("accept", "application/json")
			.with_header(self.descriptor.api_key_header.as_str(), credentials.api_key.expose())
			.with_body(body)
	}

	/// Performs the client-credentials grant once.
	pub async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken> {
		obs::observe(Step::ExchangeToken, async move {
			let request = self.token_request(credentials);
			let response = self.http_client.execute(request).await.map_err(AuthError::from)?;

			map_token_response(response).map_err(Error::from)
		})
		.await
	}
}
impl CredentialExchanger<ReqwestHttpClient> {
	/// Creates an exchanger backed by its own reqwest transport.
	pub fn new(descriptor: ProviderDescriptor) -> Result<Self> {
		let http_client = ReqwestHttpClient::new()?;

		Ok(Self::with_http_client(descriptor, http_client))
	}
}
impl<C> Debug for CredentialExchanger<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialExchanger").field("descriptor", &self.descriptor).finish()
	}
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	expires_in: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
}

fn map_token_response(response: HttpResponse) -> Result<AccessToken, AuthError> {
	let status = response.status;

	if !response.is_success() {
		return Err(map_rejection(response));
	}

	let mut de = serde_json::Deserializer::from_slice(&response.body);
	let parsed: TokenResponse = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| AuthError::MalformedResponse { source, status })?;
	let value = parsed
		.access_token
		.filter(|token| !token.trim().is_empty())
		.ok_or(AuthError::MissingAccessToken { status })?;
	let mut token = AccessToken::new(value);

	if let Some(token_type) = parsed.token_type {
		token = token.with_token_type(token_type);
	}
	if let Some(expires_in) = parsed.expires_in.as_ref().and_then(parse_expires_in) {
		token = token.with_expires_in(expires_in);
	}

	Ok(token)
}

fn map_rejection(response: HttpResponse) -> AuthError {
	let mut ctx = RejectionContext::default().with_http_status(response.status);

	match serde_json::from_slice::<OAuthErrorBody>(&response.body) {
		Ok(OAuthErrorBody { error, error_description })
			if error.is_some() || error_description.is_some() =>
		{
			if let Some(error) = error {
				ctx = ctx.with_oauth_error(error);
			}
			if let Some(description) = error_description {
				ctx = ctx.with_error_description(description);
			}
		},
		_ if !response.body.is_empty() => ctx = ctx.with_body_preview(response.text()),
		_ => {},
	}

	AuthError::Rejected {
		kind: classify_rejection(&ctx),
		status: response.status,
		reason: ctx.reason(),
		retry_after: response.retry_after,
	}
}

// Providers disagree on whether `expires_in` is a number or a numeric string.
fn parse_expires_in(value: &serde_json::Value) -> Option<Duration> {
	let secs = match value {
		serde_json::Value::Number(number) => number.as_i64()?,
		serde_json::Value::String(text) => text.trim().parse().ok()?,
		_ => return None,
	};

	(secs > 0).then(|| Duration::seconds(secs))
}

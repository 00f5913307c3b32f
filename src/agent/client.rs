//! HTTP client that authenticates every call with the exchanged bearer token.

// crates.io
use reqwest::Method;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Secret},
	error::AgentError,
	http::{HttpRequest, HttpTransport},
	obs::{self, Step},
};

/// Response returned to planners for any HTTP status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Lossy UTF-8 body.
	pub body: String,
}

/// Bearer-authenticated client bound to a single API origin.
///
/// Relative targets are appended to the base URL path. Absolute targets are accepted only when
/// they share the base URL's origin, so the token never leaves the API.
#[derive(Clone)]
pub struct AuthorizedClient {
	transport: Arc<dyn HttpTransport>,
	base_url: Url,
	authorization: Secret,
}
impl AuthorizedClient {
	/// Binds `token` to `base_url`.
	pub fn new(token: &AccessToken, base_url: Url, transport: Arc<dyn HttpTransport>) -> Self {
		Self { transport, base_url, authorization: Secret::new(token.authorization_header()) }
	}

	/// Base URL every relative target is resolved against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// `Authorization` header value stamped on every call. Callers must avoid logging it.
	pub fn authorization_header(&self) -> &str {
		self.authorization.expose()
	}

	/// Resolves `target` to an absolute URL within the bound origin.
	pub fn resolve(&self, target: &str) -> Result<Url, AgentError> {
		let target = target.trim();

		// `accounts:search` parses with scheme `accounts`; only web schemes count as absolute.
		if let Some(absolute) = Url::parse(target)
			.ok()
			.filter(|url| matches!(url.scheme(), "http" | "https"))
		{
			if absolute.origin() != self.base_url.origin() {
				return Err(AgentError::ForeignOrigin {
					url: absolute.to_string(),
					origin: self.base_url.origin().ascii_serialization(),
				});
			}

			return Ok(absolute);
		}

		let (path, query) = match target.split_once('?') {
			Some((path, query)) => (path, Some(query)),
			None => (target, None),
		};
		let mut url = self.base_url.clone();
		let joined = format!(
			"{}/{}",
			self.base_url.path().trim_end_matches('/'),
			path.trim_start_matches('/')
		);

		url.set_path(&joined);
		url.set_query(query);
		url.set_fragment(None);

		// The joined path must not re-parse into another origin.
		let reparsed = Url::parse(url.as_str())
			.map_err(|source| AgentError::InvalidTarget { target: target.to_owned(), source })?;

		if reparsed.origin() != self.base_url.origin() {
			return Err(AgentError::ForeignOrigin {
				url: reparsed.to_string(),
				origin: self.base_url.origin().ascii_serialization(),
			});
		}

		Ok(reparsed)
	}

	/// Sends one authorized request. Non-2xx statuses are returned, not raised.
	pub async fn send(
		&self,
		method: Method,
		target: &str,
		body: Option<&Value>,
	) -> Result<ApiResponse, AgentError> {
		obs::observe(Step::CallApi, async move {
			let url = self.resolve(target)?;
			let mut request = HttpRequest::new(method, url)
				.with_header("authorization", self.authorization.expose())
				.with_header("accept", "application/json");

			if let Some(body) = body {
				request = request
					.with_header("content-type", "application/json")
					.with_body(body.to_string());
			}

			let response = self.transport.execute(request).await?;

			Ok(ApiResponse { status: response.status, body: response.text() })
		})
		.await
	}
}
impl Debug for AuthorizedClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizedClient")
			.field("base_url", &self.base_url)
			.field("authorization", &"<redacted>")
			.finish()
	}
}

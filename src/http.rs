//! Transport primitives shared by the credential exchange, the authorized API client, and the
//! language-model planner.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. Requests and responses use
//! crate-owned types ([`HttpRequest`], [`HttpResponse`]) so tests can swap in scripted transports
//! without touching reqwest.

// std
use std::ops::Deref;
// crates.io
use reqwest::{
	Method,
	header::{HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports.
///
/// Implementations return every HTTP status as a response; only failures to obtain a response
/// (DNS, TCP, TLS, body read) are reported as [`TransportError`].
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes a single request without retries.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Outbound request described with primitive data.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target URL.
	pub url: Url,
	/// Header name/value pairs in insertion order.
	pub headers: Vec<(String, String)>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl HttpRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: None }
	}

	/// Appends a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Sets the request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Returns the first header value matching `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Response captured from the transport.
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response with the provided status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, retry_after: None, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Lossy UTF-8 view of the body.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Clients built by [`ReqwestHttpClient::new`] never follow redirects: the token endpoint answers
/// directly, and bearer tokens must not be replayed against a redirect target.
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Builds a client with redirects disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl HttpTransport for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let HttpRequest { method, url, headers, body } = request;
			let mut builder = self.0.request(method, url.clone());

			for (name, value) in headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response =
				builder.send().await.map_err(|err| TransportError::network(&url, err))?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response
				.bytes()
				.await
				.map_err(|err| TransportError::network(&url, err))?
				.to_vec();

			Ok(HttpResponse { status, retry_after, body })
		})
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(i64::from(secs)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use reqwest::header::HeaderValue;
	// self
	use super::*;

	#[test]
	fn retry_after_accepts_seconds_and_dates() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(7)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 +0000"));

		assert_eq!(parse_retry_after(&headers), None, "Past dates carry no hint.");

		headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));

		assert_eq!(parse_retry_after(&headers), None);
	}

	#[test]
	fn request_header_lookup_ignores_case() {
		let request = HttpRequest::new(
			Method::POST,
			Url::parse("https://example.com/token").expect("Fixture URL should parse."),
		)
		.with_header("Content-Type", "application/json");

		assert_eq!(request.header("content-type"), Some("application/json"));
		assert_eq!(request.header("accept"), None);
	}

	#[test]
	fn success_covers_2xx_only() {
		assert!(HttpResponse::new(204, Vec::new()).is_success());
		assert!(!HttpResponse::new(302, Vec::new()).is_success());
		assert!(!HttpResponse::new(401, "nope").is_success());
	}
}

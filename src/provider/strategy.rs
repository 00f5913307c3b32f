//! Classification of token-endpoint rejections.
//!
//! Structured OAuth fields (`error`, `error_description`) win, then body text hints, and finally
//! the HTTP status code.

// self
use crate::_prelude::*;

/// Canonical rejection categories for a failed credential exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionKind {
	/// Client authentication failed (bad id/secret or API key).
	InvalidClient,
	/// Request was malformed or the grant is not accepted.
	InvalidRequest,
	/// Client is authenticated but not allowed to obtain this token.
	Forbidden,
	/// Provider asked the caller to slow down.
	Throttled,
	/// Provider-side failure or an unrecognized response.
	Unavailable,
}
impl RejectionKind {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RejectionKind::InvalidClient => "invalid_client",
			RejectionKind::InvalidRequest => "invalid_request",
			RejectionKind::Forbidden => "forbidden",
			RejectionKind::Throttled => "throttled",
			RejectionKind::Unavailable => "unavailable",
		}
	}
}
impl Display for RejectionKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Primitive view of a failed token response handed to [`classify_rejection`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RejectionContext {
	/// HTTP status code returned by the provider.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
	/// Preview of the response body for non-JSON payloads.
	pub body_preview: Option<String>,
}
impl RejectionContext {
	/// Maximum number of characters kept in [`RejectionContext::body_preview`].
	pub const BODY_PREVIEW_LIMIT: usize = 256;

	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds a body preview, truncated to [`Self::BODY_PREVIEW_LIMIT`] characters.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into(), Self::BODY_PREVIEW_LIMIT));

		self
	}

	/// Human-readable reason, preferring the provider description over the raw code or body.
	pub fn reason(&self) -> String {
		self.error_description
			.as_deref()
			.or(self.oauth_error.as_deref())
			.or(self.body_preview.as_deref())
			.filter(|text| !text.trim().is_empty())
			.map(str::to_owned)
			.unwrap_or_else(|| "no details supplied".into())
	}
}

/// Classifies a failed token response.
pub fn classify_rejection(ctx: &RejectionContext) -> RejectionKind {
	if let Some(kind) =
		classify_oauth_error(ctx.oauth_error.as_deref(), ctx.error_description.as_deref())
	{
		return kind;
	}
	if let Some(kind) = classify_body(ctx.body_preview.as_deref()) {
		return kind;
	}

	classify_status(ctx.http_status)
}

/// Truncates `body` to `limit` characters, appending an ellipsis when shortened.
pub(crate) fn truncate_preview(body: String, limit: usize) -> String {
	if body.chars().count() <= limit {
		return body;
	}

	let mut buf = body.chars().take(limit).collect::<String>();

	buf.push('…');

	buf
}

fn classify_oauth_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
) -> Option<RejectionKind> {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_body(error_description))
}

fn match_exact_value(value: &str) -> Option<RejectionKind> {
	let value = value.trim();

	if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(RejectionKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_request")
		|| value.eq_ignore_ascii_case("invalid_grant")
		|| value.eq_ignore_ascii_case("unsupported_grant_type")
	{
		Some(RejectionKind::InvalidRequest)
	} else if value.eq_ignore_ascii_case("invalid_scope")
		|| value.eq_ignore_ascii_case("access_denied")
	{
		Some(RejectionKind::Forbidden)
	} else if value.eq_ignore_ascii_case("slow_down") {
		Some(RejectionKind::Throttled)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(RejectionKind::Unavailable)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<RejectionKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_client") || text.contains("unauthorized_client") =>
			Some(RejectionKind::InvalidClient),
		text if text.contains("invalid_request") || text.contains("invalid_grant") =>
			Some(RejectionKind::InvalidRequest),
		text if text.contains("invalid_scope") || text.contains("access_denied") =>
			Some(RejectionKind::Forbidden),
		text if text.contains("rate limit") || text.contains("too many requests") =>
			Some(RejectionKind::Throttled),
		text if text.contains("temporarily_unavailable") => Some(RejectionKind::Unavailable),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> RejectionKind {
	match status {
		Some(400 | 404 | 405 | 410 | 415) => RejectionKind::InvalidRequest,
		Some(401) => RejectionKind::InvalidClient,
		Some(403) => RejectionKind::Forbidden,
		Some(429) => RejectionKind::Throttled,
		_ => RejectionKind::Unavailable,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oauth_error_fields_take_precedence() {
		let ctx = RejectionContext::default().with_http_status(400).with_oauth_error("invalid_client");

		assert_eq!(classify_rejection(&ctx), RejectionKind::InvalidClient);

		let ctx = RejectionContext::default()
			.with_http_status(500)
			.with_error_description("invalid_grant: client disabled");

		assert_eq!(classify_rejection(&ctx), RejectionKind::InvalidRequest);
	}

	#[test]
	fn falls_back_to_body_then_status() {
		let ctx = RejectionContext::default().with_http_status(502).with_body_preview("Too Many Requests");

		assert_eq!(classify_rejection(&ctx), RejectionKind::Throttled);
		assert_eq!(
			classify_rejection(&RejectionContext::default().with_http_status(401)),
			RejectionKind::InvalidClient
		);
		assert_eq!(
			classify_rejection(&RejectionContext::default().with_http_status(403)),
			RejectionKind::Forbidden
		);
		assert_eq!(
			classify_rejection(&RejectionContext::default().with_http_status(503)),
			RejectionKind::Unavailable
		);
	}

	#[test]
	fn reason_prefers_description_and_truncates_bodies() {
		let ctx = RejectionContext::default()
			.with_oauth_error("invalid_client")
			.with_error_description("Client authentication failed");

		assert_eq!(ctx.reason(), "Client authentication failed");

		let long = "x".repeat(RejectionContext::BODY_PREVIEW_LIMIT + 10);
		let ctx = RejectionContext::default().with_body_preview(long);
		let preview = ctx.body_preview.expect("Preview should be recorded.");

		assert_eq!(preview.chars().count(), RejectionContext::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
		assert_eq!(RejectionContext::default().reason(), "no details supplied");
	}
}

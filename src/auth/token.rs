//! Access token issued by a single client-credentials exchange.

// self
use crate::{_prelude::*, auth::Secret};

/// Bearer token held in memory for the remainder of the run.
///
/// The token is never refreshed or persisted. `expires_in` is kept for diagnostics only.
#[derive(Clone)]
pub struct AccessToken {
	/// Token value; callers must avoid logging it.
	pub value: Secret,
	/// `token_type` reported by the provider, if any.
	pub token_type: Option<String>,
	/// Instant the exchange completed.
	pub obtained_at: OffsetDateTime,
	/// Lifetime reported by the provider, if any.
	pub expires_in: Option<Duration>,
}
impl AccessToken {
	/// Wraps a token value stamped with the current clock.
	pub fn new(value: impl Into<Secret>) -> Self {
		Self {
			value: value.into(),
			token_type: None,
			obtained_at: OffsetDateTime::now_utc(),
			expires_in: None,
		}
	}

	/// Records the provider-reported `token_type`.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Records the provider-reported lifetime.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_in = Some(expires_in);

		self
	}

	/// Overrides the obtained-at instant.
	pub fn obtained_at(mut self, instant: OffsetDateTime) -> Self {
		self.obtained_at = instant;

		self
	}

	/// Returns the `Authorization` header value for subsequent API calls.
	pub fn authorization_header(&self) -> String {
		format!("Bearer {}", self.value.expose())
	}

	/// Expiry instant derived from `obtained_at + expires_in`, when the provider reported one.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_in.map(|lifetime| self.obtained_at + lifetime)
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("value", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("obtained_at", &self.obtained_at)
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn authorization_header_uses_bearer_scheme() {
		let token = AccessToken::new("T");

		assert_eq!(token.authorization_header(), "Bearer T");
	}

	#[test]
	fn expiry_is_relative_to_obtained_at() {
		let token = AccessToken::new("T")
			.obtained_at(macros::datetime!(2025-01-01 00:00 UTC))
			.with_expires_in(Duration::minutes(30));

		assert_eq!(token.expires_at(), Some(macros::datetime!(2025-01-01 00:30 UTC)));
		assert_eq!(AccessToken::new("T").expires_at(), None);
	}

	#[test]
	fn debug_redacts_value() {
		let token = AccessToken::new("very-secret-token").with_token_type("Bearer");

		assert!(!format!("{token:?}").contains("very-secret-token"));
	}
}

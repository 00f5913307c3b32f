//! Client credentials presented to the identity endpoint.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::Secret};

/// Client id/secret/API key triple supplied once at start-up.
///
/// Values are immutable for the lifetime of the process; build a new value instead of mutating.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
	/// Provider API key sent alongside the Basic credentials.
	pub api_key: Secret,
}
impl Credentials {
	/// Bundles the three values.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
		api_key: impl Into<Secret>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			api_key: api_key.into(),
		}
	}

	/// Returns the `Authorization` header value: `Basic ` + base64 of `client_id:client_secret`.
	///
	/// Neither part is URL-encoded before encoding, so the header carries the raw pair.
	pub fn basic_authorization(&self) -> String {
		let pair = format!("{}:{}", self.client_id, self.client_secret.expose());

		format!("Basic {}", STANDARD.encode(pair))
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("api_key", &"<redacted>")
			.finish()
	}
}

//! Provider descriptor data structures shared by the exchange and the API client.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

/// Immutable provider descriptor consumed by the credential exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
	/// Token endpoint receiving the client-credentials grant.
	pub token_endpoint: Url,
	/// Base URL of the REST API described by the OpenAPI document.
	pub api_base: Url,
	/// Header carrying the provider API key on token requests.
	pub api_key_header: String,
}
impl ProviderDescriptor {
	/// Investec identity endpoint.
	pub const INVESTEC_TOKEN_ENDPOINT: &str =
		"https://openapi.investec.com/identity/v2/oauth2/token";
	/// Investec API base URL.
	pub const INVESTEC_API_BASE: &str = "https://openapi.investec.com";
	/// Header Investec expects the API key in.
	pub const INVESTEC_API_KEY_HEADER: &str = "x-api-key";

	/// Creates a new builder with no endpoints set.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new()
	}

	/// Descriptor for the Investec production API.
	pub fn investec() -> Result<Self, ProviderDescriptorError> {
		Self::builder().investec_defaults().build()
	}
}

// self
use crate::{_prelude::*, provider::ProviderDescriptor};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Token endpoint is mandatory.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// API base URL is mandatory.
	#[error("Missing API base URL.")]
	MissingApiBase,
	/// A required URL string could not be parsed.
	#[error("The {endpoint} URL is invalid: {value}.")]
	InvalidUrl {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Raw value that was supplied.
		value: String,
	},
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// API key header name is not a valid HTTP token.
	#[error("The API key header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Header name that was supplied.
		name: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Token endpoint receiving the client-credentials grant.
	pub token_endpoint: Option<Url>,
	/// Base URL of the REST API.
	pub api_base: Option<Url>,
	/// Header carrying the provider API key.
	pub api_key_header: String,
}
impl ProviderDescriptorBuilder {
	/// Creates a new, empty builder.
	pub fn new() -> Self {
		Self {
			token_endpoint: None,
			api_base: None,
			api_key_header: ProviderDescriptor::INVESTEC_API_KEY_HEADER.into(),
		}
	}

	/// Seeds the builder with the Investec production endpoints.
	pub fn investec_defaults(mut self) -> Self {
		self.token_endpoint = Url::parse(ProviderDescriptor::INVESTEC_TOKEN_ENDPOINT).ok();
		self.api_base = Url::parse(ProviderDescriptor::INVESTEC_API_BASE).ok();
		self.api_key_header = ProviderDescriptor::INVESTEC_API_KEY_HEADER.into();

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Parses and sets the token endpoint.
	pub fn token_endpoint_str(self, value: &str) -> Result<Self, ProviderDescriptorError> {
		let url = parse_url("token", value)?;

		Ok(self.token_endpoint(url))
	}

	/// Sets the API base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Parses and sets the API base URL.
	pub fn api_base_str(self, value: &str) -> Result<Self, ProviderDescriptorError> {
		let url = parse_url("api base", value)?;

		Ok(self.api_base(url))
	}

	/// Overrides the API key header name.
	pub fn api_key_header(mut self, name: impl Into<String>) -> Self {
		self.api_key_header = name.into();

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let token_endpoint =
			self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let api_base = self.api_base.ok_or(ProviderDescriptorError::MissingApiBase)?;
		let descriptor =
			ProviderDescriptor { token_endpoint, api_base, api_key_header: self.api_key_header };

		descriptor.validate()?;

		Ok(descriptor)
	}
}
impl Default for ProviderDescriptorBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("token", &self.token_endpoint)?;
		validate_endpoint("api base", &self.api_base)?;
		validate_header_name(&self.api_key_header)?;

		Ok(())
	}
}

fn parse_url(endpoint: &'static str, value: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(value)
		.map_err(|_| ProviderDescriptorError::InvalidUrl { endpoint, value: value.to_owned() })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() == "https" || is_loopback(url) {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
		Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	}
}

fn validate_header_name(name: &str) -> Result<(), ProviderDescriptorError> {
	if reqwest::header::HeaderName::from_bytes(name.as_bytes()).is_ok() {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InvalidHeaderName { name: name.to_owned() })
	}
}

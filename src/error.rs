//! Crate-level error types shared across configuration, token exchange, spec loading, and the agent.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Credential exchange against the identity endpoint failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Local OpenAPI document could not be loaded.
	#[error(transparent)]
	Spec(#[from] SpecError),
	/// Agent or planner failure.
	#[error(transparent)]
	Agent(#[from] AgentError),
}

/// Configuration and validation failures raised before any network activity.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// One or more required environment variables are absent or blank.
	#[error("Required environment variables are not set: {}.", keys.join(", "))]
	MissingEnv {
		/// Missing keys in their enumerated order.
		keys: Vec<&'static str>,
	},
	/// A URL override could not be parsed.
	#[error("The {name} URL is invalid.")]
	InvalidUrl {
		/// Which URL failed to parse.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A `.env` file was requested but could not be loaded.
	#[error("Unable to load environment file {path}: {reason}.")]
	EnvFile {
		/// Path that failed to load.
		path: String,
		/// Loader-supplied reason string.
		reason: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Logging subscriber could not be installed.
	#[error("Logging could not be initialized: {reason}.")]
	Logging {
		/// Subscriber-supplied reason string.
		reason: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures of the client-credentials exchange.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Identity endpoint answered with a non-success status.
	#[error("Token endpoint rejected the credentials ({kind}, HTTP {status}): {reason}.")]
	Rejected {
		/// Classified rejection category.
		kind: crate::provider::RejectionKind,
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Provider-supplied reason string or body preview.
		reason: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Successful response did not carry a usable `access_token`.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken {
		/// HTTP status code of the response.
		status: u16,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Network failure while calling the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Failures while loading the local OpenAPI document.
#[derive(Debug, ThisError)]
pub enum SpecError {
	/// The document could not be read from disk.
	#[error("Unable to read API specification at {path}.")]
	Read {
		/// Path that failed to load.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// The document is not valid JSON.
	#[error("API specification is not valid JSON.")]
	Parse(#[source] serde_path_to_error::Error<serde_json::Error>),
	/// Extra content follows the JSON document.
	#[error("API specification has trailing data after the JSON document.")]
	TrailingData(#[source] serde_json::Error),
	/// The document root is not a JSON object.
	#[error("API specification root must be a JSON object.")]
	NotAnObject,
	/// Neither `openapi` nor `swagger` is declared.
	#[error("API specification does not declare an openapi or swagger version.")]
	MissingVersion,
	/// The `paths` object is missing or not an object.
	#[error("API specification has no paths object.")]
	MissingPaths,
}

/// Failures raised by the agent, its planner, or the authorized API client.
#[derive(Debug, ThisError)]
pub enum AgentError {
	/// A request targeted a host outside the API's origin.
	#[error("Refusing to send the bearer token to {url}; it is outside {origin}.")]
	ForeignOrigin {
		/// Requested URL.
		url: String,
		/// Origin the client is bound to.
		origin: String,
	},
	/// Request target could not be resolved against the base URL.
	#[error("Request target `{target}` is not a valid URL.")]
	InvalidTarget {
		/// Raw target string.
		target: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The language-model endpoint answered with a non-success status.
	#[error("Language model endpoint returned HTTP {status}: {message}.")]
	Model {
		/// HTTP status code.
		status: u16,
		/// Body preview or provider message.
		message: String,
	},
	/// The language-model response could not be interpreted.
	#[error("Language model returned an unusable response: {reason}.")]
	MalformedModelResponse {
		/// Description of what was wrong.
		reason: String,
	},
	/// The planner hit its tool-call budget without producing an answer.
	#[error("Planner did not produce an answer within {max_steps} steps.")]
	StepLimit {
		/// Configured step budget.
		max_steps: usize,
	},
	/// Network failure while calling the API or the language model.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during an HTTP call.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}

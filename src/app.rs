//! End-to-end pipeline: configuration, API description, token exchange, agent.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	agent::{Agent, AuthorizedClient, DEFAULT_MAX_STEPS, DEFAULT_MODEL, OpenAiPlanner},
	auth::Secret,
	config::{Config, EnvSource},
	error::ConfigError,
	exchange::CredentialExchanger,
	http::HttpTransport,
	obs::{self, Step},
	openapi::ApiSpec,
	provider::ProviderDescriptor,
};

/// Default location of the bundled API description.
pub const DEFAULT_SPEC_PATH: &str = "swagger.json";
/// Question asked when none is supplied.
pub const DEFAULT_QUESTION: &str = "How much money do I have in my accounts?";

/// Run-time knobs for [`run`]. Secrets are not part of this; they come from the environment.
#[derive(Clone, Debug)]
pub struct Settings {
	/// Path to the OpenAPI/Swagger JSON document.
	pub spec_path: PathBuf,
	/// Question handed to the planner.
	pub question: String,
	/// Language-model identifier.
	pub model: String,
	/// Planner round-trip budget.
	pub max_steps: usize,
	/// Token endpoint override.
	pub token_url: Option<String>,
	/// API base override; defaults to the document's server URL, then the Investec base.
	pub api_base: Option<String>,
	/// Chat-completions base override.
	pub openai_base: Option<String>,
}
impl Settings {
	/// Resolves the provider descriptor from overrides and the loaded document.
	pub fn descriptor(&self, spec: &ApiSpec) -> Result<ProviderDescriptor> {
		let mut builder = ProviderDescriptor::builder().investec_defaults();

		if let Some(token_url) = &self.token_url {
			builder = builder.token_endpoint_str(token_url)?;
		}

		match (&self.api_base, spec.base_url()) {
			(Some(api_base), _) => builder = builder.api_base_str(api_base)?,
			(None, Some(api_base)) => builder = builder.api_base(api_base),
			(None, None) => {},
		}

		Ok(builder.build()?)
	}

	/// Builds the chat-completions planner.
	pub fn planner(
		&self,
		api_key: Secret,
		transport: Arc<dyn HttpTransport>,
	) -> Result<OpenAiPlanner, ConfigError> {
		let mut planner = OpenAiPlanner::new(api_key, transport)?
			.with_model(self.model.as_str())
			.with_max_steps(self.max_steps);

		if let Some(base) = &self.openai_base {
			let base = Url::parse(base)
				.map_err(|source| ConfigError::InvalidUrl { name: "OpenAI base", source })?;

			planner = planner.with_base_url(base);
		}

		Ok(planner)
	}
}
impl Default for Settings {
	fn default() -> Self {
		Self {
			spec_path: DEFAULT_SPEC_PATH.into(),
			question: DEFAULT_QUESTION.into(),
			model: DEFAULT_MODEL.into(),
			max_steps: DEFAULT_MAX_STEPS,
			token_url: None,
			api_base: None,
			openai_base: None,
		}
	}
}

/// Runs the pipeline once and returns the planner's answer.
///
/// Each stage completes before the next begins: a missing key or a malformed document fails before
/// any request reaches `transport`.
pub async fn run(
	settings: &Settings,
	env: &dyn EnvSource,
	transport: Arc<dyn HttpTransport>,
) -> Result<String> {
	let config = load_config(env)?;
	let spec = ApiSpec::from_path(&settings.spec_path)?;
	let descriptor = settings.descriptor(&spec)?;
	let api_base = descriptor.api_base.clone();
	let exchanger =
		CredentialExchanger::<dyn HttpTransport>::with_http_client(descriptor, transport.clone());
	let token = exchanger.authenticate(&config.credentials).await?;
	let client = AuthorizedClient::new(&token, api_base, transport.clone());
	let planner = settings.planner(config.openai_api_key, transport)?;

	Agent::new(spec, client, planner).invoke(&settings.question).await
}

fn load_config(env: &dyn EnvSource) -> Result<Config, ConfigError> {
	obs::observe_sync(Step::LoadConfig, || Config::load(env))
}

//! Command-line surface: argument parsing, `.env` loading, and log initialization.

// std
use std::path::PathBuf;
// crates.io
use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};
// self
use crate::{
	_prelude::*,
	agent::{DEFAULT_MAX_STEPS, DEFAULT_MODEL},
	app::{self, DEFAULT_QUESTION, DEFAULT_SPEC_PATH, Settings},
	config::ProcessEnv,
	error::ConfigError,
	http::{HttpTransport, ReqwestHttpClient},
};

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
	/// Human-readable lines.
	#[default]
	Text,
	/// One JSON object per event.
	Json,
}

/// Ask a question about your Investec accounts.
#[derive(Debug, Parser)]
#[command(name = "investec-agent", version, about, long_about = None)]
pub struct Cli {
	/// OpenAPI/Swagger JSON document describing the banking API.
	#[arg(long, env = "INVESTEC_AGENT_SPEC", default_value = DEFAULT_SPEC_PATH)]
	pub spec: PathBuf,
	/// Question handed to the agent.
	#[arg(long, env = "INVESTEC_AGENT_QUESTION", default_value = DEFAULT_QUESTION)]
	pub question: String,
	/// Chat-completions model identifier.
	#[arg(long, env = "INVESTEC_AGENT_MODEL", default_value = DEFAULT_MODEL)]
	pub model: String,
	/// Maximum model round trips before giving up.
	#[arg(long, env = "INVESTEC_AGENT_MAX_STEPS", default_value_t = DEFAULT_MAX_STEPS)]
	pub max_steps: usize,
	/// Token endpoint override.
	#[arg(long, env = "INVESTEC_AGENT_TOKEN_URL")]
	pub token_url: Option<String>,
	/// API base override.
	#[arg(long, env = "INVESTEC_AGENT_API_BASE")]
	pub api_base: Option<String>,
	/// Chat-completions base override.
	#[arg(long, env = "INVESTEC_AGENT_OPENAI_BASE")]
	pub openai_base: Option<String>,
	/// Log output format; filtering follows `RUST_LOG`.
	#[arg(long, env = "INVESTEC_AGENT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
	pub log_format: LogFormat,
	/// Environment file to load; `.env` in the working directory is tried when omitted.
	///
	/// The file is read after flags are parsed, so `INVESTEC_AGENT_*` entries in it do not
	/// change flag defaults. It only supplies the credential variables.
	#[arg(long, env = "INVESTEC_AGENT_ENV_FILE")]
	pub env_file: Option<PathBuf>,
}
impl Cli {
	/// Converts parsed arguments into pipeline settings.
	pub fn settings(&self) -> Settings {
		Settings {
			spec_path: self.spec.clone(),
			question: self.question.clone(),
			model: self.model.clone(),
			max_steps: self.max_steps,
			token_url: self.token_url.clone(),
			api_base: self.api_base.clone(),
			openai_base: self.openai_base.clone(),
		}
	}

	/// Loads the environment file into the process environment.
	///
	/// An explicit `--env-file` must exist. The implicit `.env` may be absent.
	pub fn load_env_file(&self) -> Result<(), ConfigError> {
		match &self.env_file {
			Some(path) => dotenvy::from_path(path).map_err(|e| ConfigError::EnvFile {
				path: path.display().to_string(),
				reason: e.to_string(),
			}),
			None => match dotenvy::dotenv() {
				Ok(_) => Ok(()),
				Err(e) if e.not_found() => Ok(()),
				Err(e) => Err(ConfigError::EnvFile { path: ".env".into(), reason: e.to_string() }),
			},
		}
	}
}

/// Installs the global `tracing` subscriber, writing to stderr so stdout carries only the answer.
pub fn init_tracing(format: LogFormat) -> Result<(), ConfigError> {
	let filter =
		EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();
	let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
	let result = match format {
		LogFormat::Text => builder.try_init(),
		LogFormat::Json => builder.json().try_init(),
	};

	result.map_err(|e| ConfigError::Logging { reason: e.to_string() })
}

/// Runs the pipeline against the process environment with a reqwest transport.
pub async fn run(cli: &Cli) -> Result<String> {
	let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestHttpClient::new()?);

	tracing::info!(spec = %cli.spec.display(), model = %cli.model, "answering question");

	app::run(&cli.settings(), &ProcessEnv, transport).await
}

#[cfg(test)]
mod tests {
	// std
	use std::ffi::OsString;
	// crates.io
	use clap::CommandFactory;
	// self
	use super::*;
	use crate::_preludet::temp_path;

	#[test]
	fn flags_override_defaults() {
		let cli = Cli::try_parse_from([
			"investec-agent",
			"--spec",
			"fixtures/api.json",
			"--question",
			"What did I spend on coffee?",
			"--max-steps",
			"3",
			"--log-format",
			"json",
			"--api-base",
			"http://127.0.0.1:9000",
		])
		.expect("Flags should parse.");
		let settings = cli.settings();

		assert_eq!(settings.spec_path, PathBuf::from("fixtures/api.json"));
		assert_eq!(settings.question, "What did I spend on coffee?");
		assert_eq!(settings.max_steps, 3);
		assert_eq!(settings.api_base.as_deref(), Some("http://127.0.0.1:9000"));
		assert_eq!(cli.log_format, LogFormat::Json);
	}

	#[test]
	fn rejects_unknown_log_formats() {
		assert!(Cli::try_parse_from(["investec-agent", "--log-format", "xml"]).is_err());
	}

	#[test]
	fn env_file_help_says_flag_fallbacks_are_not_read_from_it() {
		let command = Cli::command();
		let arg = command
			.get_arguments()
			.find(|arg| arg.get_id() == "env_file")
			.expect("The env file flag should exist.");
		let help =
			arg.get_long_help().expect("The env file flag should have long help.").to_string();

		assert!(help.contains("read after flags are parsed"));
		assert!(help.contains("INVESTEC_AGENT_*"));
	}

	#[test]
	fn explicit_env_file_must_exist() {
		let path = temp_path("absent-env");
		let args = [OsString::from("investec-agent"), OsString::from("--env-file"), path.into()];
		let cli = Cli::try_parse_from(args).expect("Flags should parse.");

		assert!(matches!(cli.load_env_file(), Err(ConfigError::EnvFile { .. })));
	}
}

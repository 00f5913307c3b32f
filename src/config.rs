//! Start-up configuration sourced from the environment.
//!
//! Every required key is enumerated in [`REQUIRED_ENV_VARS`] and checked exactly once by
//! [`Config::load`], before any network activity. All missing keys are reported together.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
	error::ConfigError,
};

/// Environment key holding the OAuth client identifier.
pub const CLIENT_ID_ENV: &str = "INVESTEC_CLIENT_ID";
/// Environment key holding the OAuth client secret.
pub const CLIENT_SECRET_ENV: &str = "INVESTEC_CLIENT_SECRET";
/// Environment key holding the Investec API key.
pub const API_KEY_ENV: &str = "INVESTEC_API_KEY";
/// Environment key holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Keys that must be present (and non-blank) for the process to start.
pub const REQUIRED_ENV_VARS: [&str; 4] =
	[CLIENT_ID_ENV, CLIENT_SECRET_ENV, API_KEY_ENV, OPENAI_API_KEY_ENV];

/// Read-only view over a key/value environment.
pub trait EnvSource {
	/// Returns the value for `key`, if set.
	fn var(&self, key: &str) -> Option<String>;
}

/// [`EnvSource`] backed by the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;
impl EnvSource for ProcessEnv {
	fn var(&self, key: &str) -> Option<String> {
		std::env::var(key).ok()
	}
}

impl EnvSource for HashMap<String, String> {
	fn var(&self, key: &str) -> Option<String> {
		self.get(key).cloned()
	}
}

impl EnvSource for BTreeMap<&str, &str> {
	fn var(&self, key: &str) -> Option<String> {
		self.get(key).map(|value| (*value).to_owned())
	}
}

/// Validated start-up configuration.
#[derive(Clone, Debug)]
pub struct Config {
	/// Investec client credentials.
	pub credentials: Credentials,
	/// Key used to authenticate against the language-model endpoint.
	pub openai_api_key: Secret,
}
impl Config {
	/// Loads and validates every key in [`REQUIRED_ENV_VARS`].
	///
	/// Blank values count as missing.
	pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
		let mut values = HashMap::with_capacity(REQUIRED_ENV_VARS.len());
		let mut missing = Vec::new();

		for key in REQUIRED_ENV_VARS {
			match env.var(key).filter(|value| !value.trim().is_empty()) {
				Some(value) => {
					values.insert(key, value);
				},
				None => missing.push(key),
			}
		}

		if !missing.is_empty() {
			return Err(ConfigError::MissingEnv { keys: missing });
		}

		let mut take = |key: &str| values.remove(key).unwrap_or_default();
		let credentials =
			Credentials::new(take(CLIENT_ID_ENV), take(CLIENT_SECRET_ENV), take(API_KEY_ENV));
		let openai_api_key = Secret::new(take(OPENAI_API_KEY_ENV));

		Ok(Self { credentials, openai_api_key })
	}

	/// Loads configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::load(&ProcessEnv)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn full_env() -> BTreeMap<&'static str, &'static str> {
		BTreeMap::from([
			(CLIENT_ID_ENV, "client"),
			(CLIENT_SECRET_ENV, "secret"),
			(API_KEY_ENV, "api-key"),
			(OPENAI_API_KEY_ENV, "sk-test"),
		])
	}

	#[test]
	fn loads_complete_environment() {
		let config = Config::load(&full_env()).expect("Complete environment should load.");

		assert_eq!(config.credentials.client_id, "client");
		assert_eq!(config.credentials.client_secret.expose(), "secret");
		assert_eq!(config.credentials.api_key.expose(), "api-key");
		assert_eq!(config.openai_api_key.expose(), "sk-test");
	}

	#[test]
	fn every_missing_subset_is_reported() {
		for mask in 1_u8..16 {
			let mut env = full_env();
			let expected = REQUIRED_ENV_VARS
				.iter()
				.enumerate()
				.filter(|(idx, _)| mask & (1 << idx) != 0)
				.map(|(_, key)| *key)
				.collect::<Vec<_>>();

			for key in &expected {
				env.remove(key);
			}

			match Config::load(&env) {
				Err(ConfigError::MissingEnv { keys }) => assert_eq!(keys, expected),
				other => panic!("Mask {mask:#06b} should fail with MissingEnv, got {other:?}."),
			}
		}
	}

	#[test]
	fn blank_values_count_as_missing() {
		let mut env = full_env();

		env.insert(CLIENT_SECRET_ENV, "   ");

		let err = Config::load(&env).expect_err("Blank secret should be rejected.");

		assert!(matches!(err, ConfigError::MissingEnv { keys } if keys == [CLIENT_SECRET_ENV]));
	}
}

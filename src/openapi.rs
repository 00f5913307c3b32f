//! Local OpenAPI/Swagger document handling.
//!
//! The document is kept as raw JSON; the crate only validates its shape and derives an operation
//! catalogue and base URL for the planner. Reduction and interpretation belong to the planner.

// std
use std::path::Path;
// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	error::SpecError,
	obs::{self, Step},
	provider::ProviderDescriptor,
};

const HTTP_METHODS: [&str; 8] =
	["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// Single `(method, path)` entry of the operation catalogue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
	/// Upper-case HTTP method.
	pub method: String,
	/// Path template as written in the document.
	pub path: String,
	/// `operationId`, when declared.
	pub operation_id: Option<String>,
	/// `summary` (or `description` as fallback), when declared.
	pub summary: Option<String>,
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} {}", self.method, self.path)?;

		if let Some(summary) = &self.summary {
			write!(f, " - {summary}")?;
		}

		Ok(())
	}
}

/// Validated OpenAPI 3 or Swagger 2 document.
#[derive(Clone, Debug)]
pub struct ApiSpec {
	document: Map<String, Value>,
}
impl ApiSpec {
	/// Reads and validates the document at `path`.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SpecError> {
		let path = path.as_ref();

		obs::observe_sync(Step::LoadSpec, || {
			std::fs::read(path)
				.map_err(|source| SpecError::Read { path: path.display().to_string(), source })
				.and_then(|bytes| Self::from_slice(&bytes))
		})
	}

	/// Parses and validates an in-memory document.
	pub fn from_slice(bytes: &[u8]) -> Result<Self, SpecError> {
		let mut de = serde_json::Deserializer::from_slice(bytes);
		let value: Value = serde_path_to_error::deserialize(&mut de).map_err(SpecError::Parse)?;

		de.end().map_err(SpecError::TrailingData)?;

		Self::from_value(value)
	}

	/// Validates an already parsed document.
	pub fn from_value(value: Value) -> Result<Self, SpecError> {
		let Value::Object(document) = value else {
			return Err(SpecError::NotAnObject);
		};

		if !document.contains_key("openapi") && !document.contains_key("swagger") {
			return Err(SpecError::MissingVersion);
		}
		if !document.get("paths").is_some_and(Value::is_object) {
			return Err(SpecError::MissingPaths);
		}

		Ok(Self { document })
	}

	/// Returns the raw document.
	pub fn document(&self) -> &Map<String, Value> {
		&self.document
	}

	/// `info.title`, when declared.
	pub fn title(&self) -> Option<&str> {
		self.info_field("title")
	}

	/// `info.version`, when declared.
	pub fn version(&self) -> Option<&str> {
		self.info_field("version")
	}

	/// Server base URL: OpenAPI 3 `servers[0].url` or Swagger 2 `schemes/host/basePath`.
	///
	/// A relative `servers[0].url` is joined onto [`ProviderDescriptor::INVESTEC_API_BASE`].
	pub fn base_url(&self) -> Option<Url> {
		if let Some(url) = self
			.document
			.get("servers")
			.and_then(Value::as_array)
			.and_then(|servers| servers.first())
			.and_then(|server| server.get("url"))
			.and_then(Value::as_str)
		{
			return match Url::parse(url) {
				Ok(url) => Some(url),
				// Relative server URLs are resolved against the Investec origin.
				Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(
					ProviderDescriptor::INVESTEC_API_BASE,
				)
				.and_then(|base| base.join(url))
				.ok(),
				Err(_) => None,
			};
		}

		let host = self.document.get("host").and_then(Value::as_str)?;
		let scheme = self
			.document
			.get("schemes")
			.and_then(Value::as_array)
			.and_then(|schemes| {
				let mut schemes = schemes.iter().filter_map(Value::as_str);

				if schemes.clone().any(|scheme| scheme == "https") {
					Some("https")
				} else {
					schemes.next()
				}
			})
			.unwrap_or("https");
		let base_path = self.document.get("basePath").and_then(Value::as_str).unwrap_or("");

		Url::parse(&format!("{scheme}://{host}{base_path}")).ok()
	}

	/// Every declared operation, sorted by path then method.
	pub fn operations(&self) -> Vec<Operation> {
		let Some(paths) = self.document.get("paths").and_then(Value::as_object) else {
			return Vec::new();
		};
		let mut operations = Vec::new();

		for (path, item) in paths {
			let Some(item) = item.as_object() else { continue };

			for method in HTTP_METHODS {
				let Some(op) = item.get(method).and_then(Value::as_object) else { continue };
				let text = |key: &str| op.get(key).and_then(Value::as_str).map(str::to_owned);

				operations.push(Operation {
					method: method.to_ascii_uppercase(),
					path: path.clone(),
					operation_id: text("operationId"),
					summary: text("summary").or_else(|| text("description")),
				});
			}
		}

		operations.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.method.cmp(&b.method)));

		operations
	}

	fn info_field(&self, key: &str) -> Option<&str> {
		self.document.get("info").and_then(|info| info.get(key)).and_then(Value::as_str)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const OPENAPI: &str = r#"{
		"openapi": "3.0.1",
		"info": { "title": "Private Banking", "version": "v1" },
		"servers": [{ "url": "https://openapi.investec.com" }],
		"paths": {
			"/za/pb/v1/accounts/{accountId}/balance": {
				"get": { "operationId": "getBalance", "summary": "Get account balance" }
			},
			"/za/pb/v1/accounts": {
				"parameters": [],
				"get": { "description": "List accounts" }
			}
		}
	}"#;

	#[test]
	fn parses_openapi_documents() {
		let spec = ApiSpec::from_slice(OPENAPI.as_bytes()).expect("Fixture should validate.");

		assert_eq!(spec.title(), Some("Private Banking"));
		assert_eq!(spec.version(), Some("v1"));
		assert_eq!(
			spec.base_url().map(|url| url.to_string()),
			Some("https://openapi.investec.com/".into())
		);

		let operations = spec.operations();

		assert_eq!(operations.len(), 2);
		assert_eq!(operations[0].to_string(), "GET /za/pb/v1/accounts - List accounts");
		assert_eq!(operations[1].operation_id.as_deref(), Some("getBalance"));
	}

	#[test]
	fn swagger_base_url_prefers_https() {
		let spec = ApiSpec::from_slice(
			br#"{"swagger":"2.0","host":"api.example.com","basePath":"/v2","schemes":["http","https"],"paths":{}}"#,
		)
		.expect("Swagger fixture should validate.");

		assert_eq!(
			spec.base_url().map(|url| url.to_string()),
			Some("https://api.example.com/v2".into())
		);
		assert!(spec.operations().is_empty());
	}

	#[test]
	fn relative_server_urls_keep_their_prefix() {
		let spec = ApiSpec::from_slice(
			br#"{"openapi":"3.0.0","servers":[{"url":"/za/pb/v1"}],"paths":{"/accounts":{"get":{}}}}"#,
		)
		.expect("Relative server fixture should validate.");

		assert_eq!(
			spec.base_url().map(|url| url.to_string()),
			Some("https://openapi.investec.com/za/pb/v1".into())
		);
	}

	#[test]
	fn rejects_malformed_documents() {
		assert!(matches!(ApiSpec::from_slice(b"{\"openapi\": "), Err(SpecError::Parse(_))));
		assert!(matches!(ApiSpec::from_slice(b"{} trailing"), Err(SpecError::TrailingData(_))));
		assert!(matches!(ApiSpec::from_slice(b"[1, 2]"), Err(SpecError::NotAnObject)));
		assert!(matches!(ApiSpec::from_slice(b"{\"paths\": {}}"), Err(SpecError::MissingVersion)));
		assert!(matches!(
			ApiSpec::from_slice(b"{\"openapi\": \"3.0.0\", \"paths\": []}"),
			Err(SpecError::MissingPaths)
		));
	}

	#[test]
	fn missing_file_is_a_read_error() {
		let err = ApiSpec::from_path("definitely/not/here.json")
			.expect_err("Missing files should fail.");

		assert!(matches!(err, SpecError::Read { .. }));
	}
}

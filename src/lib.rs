//! Investec client-credentials exchange and an OpenAPI-driven agent that answers free-text
//! questions about your accounts.
//!
//! The pipeline validates the environment, loads the local API description, trades the Investec
//! credentials for a bearer token, and hands the token-bearing client to a language-model planner.
//! Each stage fails before the next one starts, so no network call is made with bad input.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod agent;
pub mod app;
pub mod auth;
#[cfg(feature = "cli")] pub mod cli;
pub mod config;
pub mod error;
pub mod exchange;
pub mod http;
pub mod obs;
pub mod openapi;
pub mod provider;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		path::PathBuf,
		sync::{
			Mutex,
			atomic::{AtomicU64, Ordering},
		},
	};
	// crates.io
	use reqwest::redirect::Policy;
	// self
	use crate::http::{HttpRequest, HttpResponse, HttpTransport, ReqwestHttpClient, TransportFuture};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Returns a unique, not-yet-created path under the system temp directory.
	pub fn temp_path(label: &str) -> PathBuf {
		static COUNTER: AtomicU64 = AtomicU64::new(0);

		let seq = COUNTER.fetch_add(1, Ordering::Relaxed);

		std::env::temp_dir().join(format!(
			"investec-agent-{label}-{}-{seq}.json",
			std::process::id()
		))
	}

	/// Transport that replays canned responses in order and records every request.
	///
	/// Once the script runs out it answers `500 script exhausted`.
	#[derive(Debug, Default)]
	pub struct ScriptedTransport {
		responses: Mutex<VecDeque<HttpResponse>>,
		requests: Mutex<Vec<HttpRequest>>,
	}
	impl ScriptedTransport {
		/// Creates a transport that replays `responses` in order.
		pub fn new(responses: impl IntoIterator<Item = HttpResponse>) -> Self {
			Self {
				responses: Mutex::new(responses.into_iter().collect()),
				requests: Mutex::new(Vec::new()),
			}
		}

		/// Requests observed so far.
		pub fn requests(&self) -> Vec<HttpRequest> {
			self.requests.lock().expect("Request log lock should not be poisoned.").clone()
		}
	}
	impl HttpTransport for ScriptedTransport {
		fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
			self.requests.lock().expect("Request log lock should not be poisoned.").push(request);

			let response = self
				.responses
				.lock()
				.expect("Response script lock should not be poisoned.")
				.pop_front()
				.unwrap_or_else(|| HttpResponse::new(500, "script exhausted"));

			Box::pin(async move { Ok(response) })
		}
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(feature = "cli")] use {color_eyre as _, tokio as _};
#[cfg(test)] use {color_eyre as _, httpmock as _};

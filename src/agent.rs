//! Agent seam: hands the API description, an authorized client, and a language-model planner a
//! single free-text question.
//!
//! [`Planner`] is the boundary to the external reasoning component. The crate ships
//! [`OpenAiPlanner`], a thin chat-completions adapter, but any implementation can be plugged in.

pub mod client;
pub mod openai;

pub use client::*;
pub use openai::*;

// self
use crate::{
	_prelude::*,
	obs::{self, Step},
	openapi::ApiSpec,
};

/// Boxed future returned by [`Planner::plan`].
pub type PlanFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a + Send>>;

/// External planning component that decides which API calls answer a question.
pub trait Planner
where
	Self: Send + Sync,
{
	/// Answers `question`, issuing any calls it needs through `client`.
	fn plan<'a>(
		&'a self,
		spec: &'a ApiSpec,
		client: &'a AuthorizedClient,
		question: &'a str,
	) -> PlanFuture<'a>;
}

/// Bundles the API description, the authorized client, and a planner.
pub struct Agent {
	/// API description handed to the planner.
	pub spec: ApiSpec,
	/// Bearer-authenticated client the planner calls through.
	pub client: AuthorizedClient,
	planner: Box<dyn Planner>,
}
impl Agent {
	/// Creates an agent around `planner`.
	pub fn new(spec: ApiSpec, client: AuthorizedClient, planner: impl 'static + Planner) -> Self {
		Self { spec, client, planner: Box::new(planner) }
	}

	/// Invokes the planner with one question and returns its final answer.
	pub async fn invoke(&self, question: &str) -> Result<String> {
		let plan = self.planner.plan(&self.spec, &self.client, question);

		obs::observe(Step::InvokeAgent, plan).await
	}
}
impl Debug for Agent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Agent")
			.field("spec_title", &self.spec.title())
			.field("client", &self.client)
			.finish()
	}
}

//! Chat-completions planner that drives the authorized client through a single `call_api` tool.

// crates.io
use reqwest::Method;
use serde_json::{Value, json};
// self
use crate::{
	_prelude::*,
	agent::{AuthorizedClient, PlanFuture, Planner},
	auth::Secret,
	error::{AgentError, ConfigError},
	http::{HttpRequest, HttpTransport},
	obs::{self, Step},
	openapi::ApiSpec,
	provider::strategy::truncate_preview,
};

/// Default chat-completions base URL.
pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1/";
/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4";
/// Default number of model round trips before giving up.
pub const DEFAULT_MAX_STEPS: usize = 10;
/// Maximum characters of an API response handed back to the model.
pub const TOOL_RESULT_LIMIT: usize = 4_000;
/// Name of the single tool exposed to the model.
pub const CALL_API_TOOL: &str = "call_api";

const MODEL_ERROR_PREVIEW_LIMIT: usize = 256;

/// [`Planner`] backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiPlanner {
	transport: Arc<dyn HttpTransport>,
	api_key: Secret,
	base_url: Url,
	model: String,
	temperature: f32,
	max_steps: usize,
}
impl OpenAiPlanner {
	/// Creates a planner against [`DEFAULT_OPENAI_BASE`] with [`DEFAULT_MODEL`].
	pub fn new(
		api_key: impl Into<Secret>,
		transport: Arc<dyn HttpTransport>,
	) -> Result<Self, ConfigError> {
		let base_url = Url::parse(DEFAULT_OPENAI_BASE)
			.map_err(|source| ConfigError::InvalidUrl { name: "OpenAI base", source })?;

		Ok(Self {
			transport,
			api_key: api_key.into(),
			base_url,
			model: DEFAULT_MODEL.into(),
			temperature: 0.,
			max_steps: DEFAULT_MAX_STEPS,
		})
	}

	/// Overrides the model identifier.
	pub fn with_model(mut self, model: impl Into<String>) -> Self {
		self.model = model.into();

		self
	}

	/// Overrides the endpoint base; `chat/completions` is resolved beneath it.
	pub fn with_base_url(mut self, mut base_url: Url) -> Self {
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		self.base_url = base_url;

		self
	}

	/// Overrides the round-trip budget. Zero is raised to one.
	pub fn with_max_steps(mut self, max_steps: usize) -> Self {
		self.max_steps = max_steps.max(1);

		self
	}

	/// Overrides the sampling temperature.
	pub fn with_temperature(mut self, temperature: f32) -> Self {
		self.temperature = temperature;

		self
	}

	/// Configured model identifier.
	pub fn model(&self) -> &str {
		&self.model
	}

	/// Configured round-trip budget.
	pub fn max_steps(&self) -> usize {
		self.max_steps
	}

	/// Chat-completions endpoint derived from the base URL.
	pub fn completions_url(&self) -> Result<Url, AgentError> {
		self.base_url.join("chat/completions").map_err(|source| AgentError::InvalidTarget {
			target: "chat/completions".into(),
			source,
		})
	}

	async fn run(
		&self,
		spec: &ApiSpec,
		client: &AuthorizedClient,
		question: &str,
	) -> Result<String, AgentError> {
		let mut messages = vec![
			json!({ "role": "system", "content": system_prompt(spec, client) }),
			json!({ "role": "user", "content": question }),
		];

		for _ in 0..self.max_steps {
			let message = self.complete(&messages).await?;

			if message.tool_calls().is_empty() {
				return message.content.filter(|content| !content.trim().is_empty()).ok_or_else(
					|| AgentError::MalformedModelResponse {
						reason: "assistant returned neither content nor tool calls".into(),
					},
				);
			}

			messages.push(message.to_json());

			for call in message.tool_calls() {
				let output = run_tool(client, call).await?;

				messages.push(json!({ "role": "tool", "tool_call_id": call.id, "content": output }));
			}
		}

		Err(AgentError::StepLimit { max_steps: self.max_steps })
	}

	async fn complete(&self, messages: &[Value]) -> Result<AssistantMessage, AgentError> {
		obs::observe(Step::CallModel, async move {
			let body = json!({
				"model": self.model,
				"temperature": self.temperature,
				"messages": messages,
				"tools": [call_api_tool()],
			});
			let request = HttpRequest::new(Method::POST, self.completions_url()?)
				.with_header("authorization", format!("Bearer {}", self.api_key.expose()))
				.with_header("content-type", "application/json")
				.with_header("accept", "application/json")
				.with_body(body.to_string());
			let response = self.transport.execute(request).await?;

			if !response.is_success() {
				return Err(AgentError::Model {
					status: response.status,
					message: model_error_message(&response.body),
				});
			}

			let parsed: ChatResponse = serde_json::from_slice(&response.body)
				.map_err(|e| AgentError::MalformedModelResponse { reason: e.to_string() })?;

			parsed.choices.into_iter().next().map(|choice| choice.message).ok_or_else(|| {
				AgentError::MalformedModelResponse { reason: "response has no choices".into() }
			})
		})
		.await
	}
}
impl Planner for OpenAiPlanner {
	fn plan<'a>(
		&'a self,
		spec: &'a ApiSpec,
		client: &'a AuthorizedClient,
		question: &'a str,
	) -> PlanFuture<'a> {
		Box::pin(async move { self.run(spec, client, question).await.map_err(Error::from) })
	}
}
impl Debug for OpenAiPlanner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OpenAiPlanner")
			.field("base_url", &self.base_url)
			.field("model", &self.model)
			.field("temperature", &self.temperature)
			.field("max_steps", &self.max_steps)
			.field("api_key", &self.api_key)
			.finish()
	}
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
	#[serde(default)]
	choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
	message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
	#[serde(default)]
	content: Option<String>,
	#[serde(default)]
	tool_calls: Option<Vec<ToolCall>>,
}
impl AssistantMessage {
	fn tool_calls(&self) -> &[ToolCall] {
		self.tool_calls.as_deref().unwrap_or_default()
	}

	fn to_json(&self) -> Value {
		let tool_calls = self
			.tool_calls()
			.iter()
			.map(|call| {
				json!({
					"id": call.id,
					"type": "function",
					"function": { "name": call.function.name, "arguments": call.function.arguments },
				})
			})
			.collect::<Vec<_>>();

		json!({ "role": "assistant", "content": self.content, "tool_calls": tool_calls })
	}
}

#[derive(Debug, Deserialize)]
struct ToolCall {
	id: String,
	function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
	name: String,
	#[serde(default)]
	arguments: String,
}

#[derive(Debug, Deserialize)]
struct CallApiArgs {
	method: String,
	path: String,
	#[serde(default)]
	body: Option<Value>,
}

fn call_api_tool() -> Value {
	json!({
		"type": "function",
		"function": {
			"name": CALL_API_TOOL,
			"description": "Call the banking API with the stored bearer token and return the HTTP status and body.",
			"parameters": {
				"type": "object",
				"properties": {
					"method": { "type": "string", "description": "HTTP method, e.g. GET." },
					"path": { "type": "string", "description": "Path relative to the API base URL, including any query string." },
					"body": { "type": "object", "description": "Optional JSON request body." }
				},
				"required": ["method", "path"]
			}
		}
	})
}

fn system_prompt(spec: &ApiSpec, client: &AuthorizedClient) -> String {
	let mut prompt = format!(
		"You answer questions about the user's bank accounts by calling the {} API at {}.\n\
		 Use the `{CALL_API_TOOL}` tool with paths relative to that base URL. Available operations:\n",
		spec.title().unwrap_or("banking"),
		client.base_url()
	);

	for operation in spec.operations() {
		prompt.push_str("- ");
		prompt.push_str(&operation.to_string());
		prompt.push('\n');
	}

	prompt.push_str("When you have the answer, reply in plain language without calling further tools.");

	prompt
}

// Argument and targeting mistakes go back to the model as text; transport failures abort.
async fn run_tool(client: &AuthorizedClient, call: &ToolCall) -> Result<String, AgentError> {
	if call.function.name != CALL_API_TOOL {
		return Ok(format!(
			"Unknown tool `{}`; only `{CALL_API_TOOL}` is available.",
			call.function.name
		));
	}

	let args = match serde_json::from_str::<CallApiArgs>(&call.function.arguments) {
		Ok(args) => args,
		Err(e) => return Ok(format!("Invalid `{CALL_API_TOOL}` arguments: {e}.")),
	};
	let Ok(method) = Method::from_bytes(args.method.trim().to_ascii_uppercase().as_bytes()) else {
		return Ok(format!("Unsupported HTTP method `{}`.", args.method));
	};

	match client.send(method, &args.path, args.body.as_ref()).await {
		Ok(response) => Ok(truncate_preview(
			format!("HTTP {}\n{}", response.status, response.body),
			TOOL_RESULT_LIMIT,
		)),
		Err(e @ (AgentError::ForeignOrigin { .. } | AgentError::InvalidTarget { .. })) =>
			Ok(format!("Request refused: {e}")),
		Err(e) => Err(e),
	}
}

fn model_error_message(body: &[u8]) -> String {
	serde_json::from_slice::<Value>(body)
		.ok()
		.and_then(|value| value.pointer("/error/message").and_then(Value::as_str).map(str::to_owned))
		.unwrap_or_else(|| {
			truncate_preview(String::from_utf8_lossy(body).into_owned(), MODEL_ERROR_PREVIEW_LIMIT)
		})
}

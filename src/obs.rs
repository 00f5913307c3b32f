//! Optional observability helpers for pipeline steps.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `investec_agent.step` with the `step` field.
//! - Enable `metrics` to increment the `investec_agent_step_total` counter for every
//!   attempt/success/failure, labeled by `step` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Pipeline steps observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
	/// Environment validation.
	LoadConfig,
	/// OpenAPI document loading.
	LoadSpec,
	/// Client-credentials exchange.
	ExchangeToken,
	/// Agent invocation for one question.
	InvokeAgent,
	/// Single authorized call against the banking API.
	CallApi,
	/// Single chat-completions round trip.
	CallModel,
}
impl Step {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Step::LoadConfig => "load_config",
			Step::LoadSpec => "load_spec",
			Step::ExchangeToken => "exchange_token",
			Step::InvokeAgent => "invoke_agent",
			Step::CallApi => "call_api",
			Step::CallModel => "call_model",
		}
	}
}
impl Display for Step {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
	/// Entry to a step.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StepOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StepOutcome::Attempt => "attempt",
			StepOutcome::Success => "success",
			StepOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto [`StepOutcome::Success`] or [`StepOutcome::Failure`].
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { StepOutcome::Success } else { StepOutcome::Failure }
	}
}
impl Display for StepOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside the span for `step`, recording the attempt and its outcome.
pub async fn observe<T, E, Fut>(step: Step, fut: Fut) -> Result<T, E>
where
	Fut: Future<Output = Result<T, E>>,
{
	let span = StepSpan::new(step);

	record_step_outcome(step, StepOutcome::Attempt);

	let result = span.instrument(fut).await;

	record_step_outcome(step, StepOutcome::of(&result));

	result
}

/// Synchronous counterpart of [`observe`]; `f` runs with the span entered.
pub fn observe_sync<T, E>(step: Step, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
	let _span = StepSpan::new(step).entered();

	record_step_outcome(step, StepOutcome::Attempt);

	let result = f();

	record_step_outcome(step, StepOutcome::of(&result));

	result
}

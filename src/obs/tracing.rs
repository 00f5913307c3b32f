// self
use crate::{_prelude::*, obs::Step};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStep<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStep<F> = F;

/// A span builder used by pipeline steps.
#[derive(Clone, Debug)]
pub struct StepSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StepSpan {
	/// Creates a new span tagged with the provided step.
	pub fn new(step: Step) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("investec_agent.step", step = step.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = step;

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> StepSpanGuard {
		#[cfg(feature = "tracing")]
		{
			StepSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			StepSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStep<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`StepSpan::entered`].
pub struct StepSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for StepSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StepSpanGuard(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn step_span_guard_exists_without_subscriber() {
		let _guard = StepSpan::new(Step::LoadSpec).entered();
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = StepSpan::new(Step::ExchangeToken);
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}

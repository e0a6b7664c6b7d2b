// self
use crate::_prelude::*;

/// A span builder used around client requests.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the HTTP method + stage.
	pub fn new(method: &Method, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("fhir_client.request", method = method.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, stage);

			Self {}
		}
	}

	/// Enters the span for the duration of the returned guard.
	pub fn entered(self) -> RequestSpanGuard {
		#[cfg(feature = "tracing")]
		{
			RequestSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			RequestSpanGuard {}
		}
	}
}

/// RAII guard returned by [`RequestSpan::entered`].
pub struct RequestSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for RequestSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RequestSpanGuard(..)")
	}
}

/// Logs a failed token attempt; the failure is only surfaced once retries run out.
pub fn trace_token_attempt_failure(attempt: u32, max_attempts: u32, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		if attempt < max_attempts {
			tracing::debug!(attempt, max_attempts, error = %error, "token attempt failed; retrying");
		} else {
			tracing::warn!(attempt, max_attempts, error = %error, "token attempts exhausted");
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (attempt, max_attempts, error);
	}
}

/// Logs a pagination state replacement.
pub fn trace_pagination_update(has_self: bool, has_next: bool, has_previous: bool) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(has_self, has_next, has_previous, "pagination links replaced");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (has_self, has_next, has_previous);
	}
}

//! Optional observability helpers for client requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `fhir_client.request` with the `method`
//!   and `stage` (call site) fields, plus events for failed token attempts.
//! - Enable `metrics` to increment the `fhir_client_request_total` counter for every
//!   attempt/success/failure, labeled by `method` + `outcome`, and the
//!   `fhir_client_token_attempt_total` counter labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each request or token attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller (or retried, for token attempts).
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

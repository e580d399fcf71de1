//! Optional observability helpers for token requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to wrap each request in a span named `keycloak_token_request.request`
//!   with the `grant` and `stage` fields. No events are emitted.
//! - Enable `metrics` to increment the `keycloak_token_request_total` counter for every
//!   attempt/success/failure, labeled by `grant` + `outcome`.
//!
//! With both features disabled every helper compiles down to a no-op.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Outcome labels recorded for each request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Request is about to be sent.
	Attempt,
	/// Token payload received.
	Success,
	/// Failure propagated back to the caller.
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

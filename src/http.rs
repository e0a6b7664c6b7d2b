//! Transport primitives for FHIR and token endpoint exchanges.
//!
//! The module exposes [`FhirHttpClient`], the client's only dependency on an HTTP stack.
//! Requests and responses are plain [`http`](oauth2::http) values with byte bodies, so any
//! blocking client can be plugged in. [`ReqwestHttpClient`] is the default implementation
//! behind the `reqwest` feature.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
pub use oauth2::{HttpRequest, HttpResponse};
// self
use crate::_prelude::*;

/// Abstraction over blocking HTTP transports.
///
/// Implementations send the request as-is: headers, body, and the `Authorization` value
/// have already been applied by the caller. The per-request `timeout` is passed straight
/// through; connection pooling, TLS, and transport-level retries are the implementation's
/// concern. Implementations must be `Send + Sync + 'static` so a single transport can be
/// shared across clients behind an [`Arc`].
pub trait FhirHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes `request`, blocking until the full response body is available.
	fn execute(
		&self,
		request: HttpRequest,
		timeout: Option<Duration>,
	) -> Result<HttpResponse, Self::TransportError>;
}
/// Thin wrapper around a blocking [`ReqwestBlockingClient`] so shared HTTP behavior lives in
/// one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestBlockingClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestBlockingClient`].
	pub fn with_client(client: ReqwestBlockingClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestBlockingClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestBlockingClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestBlockingClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl FhirHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(
		&self,
		request: HttpRequest,
		timeout: Option<Duration>,
	) -> Result<HttpResponse, Self::TransportError> {
		let mut request = reqwest::blocking::Request::try_from(request)?;

		*request.timeout_mut() = timeout;

		let response = self.0.execute(request)?;
		let status = response.status();
		let headers = response.headers().to_owned();
		let mut response_new = HttpResponse::new(response.bytes()?.to_vec());

		*response_new.status_mut() = status;
		*response_new.headers_mut() = headers;

		Ok(response_new)
	}
}


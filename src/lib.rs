//! Blocking FHIR REST client: CRUD against resource endpoints, Basic or OAuth 2.0
//! client-credentials request signing, and tracking of server-driven pagination links.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod obs;
pub mod pagination;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::AuthStrategy,
		client::{FhirClient, FhirClientBuilder},
		http::ReqwestHttpClient,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = FhirClient<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestBlockingClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Starts a builder for `base_url` wired to [`test_reqwest_http_client`].
	pub fn reqwest_test_client_builder(base_url: &str) -> FhirClientBuilder<ReqwestHttpClient> {
		FhirClientBuilder::new(base_url, test_reqwest_http_client())
	}

	/// Constructs a [`FhirClient`] against `base_url` with an optional auth strategy and the
	/// reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(base_url: &str, auth: Option<AuthStrategy>) -> ReqwestTestClient {
		let mut builder = reqwest_test_client_builder(base_url);

		if let Some(auth) = auth {
			builder = builder.auth(auth);
		}

		builder.build().expect("Failed to build FHIR client for tests.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		sync::Arc,
		time::Duration,
	};

	pub use oauth2::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Error as ReqwestError, blocking::Client as ReqwestBlockingClient};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, parking_lot as _};

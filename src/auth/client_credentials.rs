//! OAuth 2.0 client-credentials token acquisition with bounded immediate retries.
//!
//! A fresh access token is requested for every signed request; nothing is cached. Each
//! attempt posts `client_id`, `client_secret`, and `grant_type=client_credentials` as a
//! form body and reads `access_token` from the JSON reply. The first successful attempt
//! ends the loop. Failed attempts are retried back-to-back (no delay) until `max_attempts`
//! requests have been issued, after which the last failure is surfaced.

// crates.io
use oauth2::AccessToken;
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::{AuthenticationError, ConfigError, TokenFetchError, TransportError},
	http::{FhirHttpClient, HttpRequest},
	obs::{self, RequestOutcome},
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: Option<String>,
}

/// Client-credentials configuration for a token endpoint.
///
/// Equality compares the endpoint, client identifier, and secret; `max_attempts` is not
/// part of a strategy's identity.
#[derive(Clone, Debug)]
pub struct OAuth2Credentials {
	token_endpoint: Url,
	client_id: String,
	client_secret: Secret,
	max_attempts: u32,
}
impl OAuth2Credentials {
	/// Attempts issued per signed request unless overridden.
	pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

	/// Validates the endpoint and credentials; retries default to
	/// [`Self::DEFAULT_MAX_ATTEMPTS`].
	pub fn new(
		token_endpoint: &str,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		if token_endpoint.is_empty() {
			return Err(ConfigError::MissingField { field: "token_endpoint" });
		}

		let token_endpoint = Url::parse(token_endpoint)
			.map_err(|source| ConfigError::InvalidUrl { field: "token endpoint", source })?;
		let client_id = client_id.into();
		let client_secret = Secret::new(client_secret);

		if client_id.is_empty() {
			return Err(ConfigError::MissingField { field: "client_id" });
		}
		if client_secret.is_empty() {
			return Err(ConfigError::MissingField { field: "client_secret" });
		}

		Ok(Self {
			token_endpoint,
			client_id,
			client_secret,
			max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
		})
	}

	/// Overrides the total number of token requests per signed request (at least 1).
	pub fn with_max_attempts(mut self, max_attempts: u32) -> Result<Self, ConfigError> {
		if max_attempts == 0 {
			return Err(ConfigError::ZeroMaxAttempts);
		}

		self.max_attempts = max_attempts;

		Ok(self)
	}

	/// Token endpoint URL.
	pub fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}

	/// OAuth 2.0 client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Total token requests allowed per signed request.
	pub fn max_attempts(&self) -> u32 {
		self.max_attempts
	}

	/// Requests a new access token, retrying immediately on failure.
	///
	/// Exactly one request is issued per attempt. Returns the first token obtained, or
	/// [`AuthenticationError::RetriesExhausted`] carrying the final attempt's failure once
	/// `max_attempts` requests have failed.
	pub fn fetch_token<C>(
		&self,
		http_client: &C,
		timeout: Option<Duration>,
	) -> Result<AccessToken, AuthenticationError>
	where
		C: ?Sized + FhirHttpClient,
	{
		let mut attempt = 0;

		loop {
			attempt += 1;

			match self.request_token(http_client, timeout) {
				Ok(token) => {
					obs::record_token_attempt(RequestOutcome::Success);

					return Ok(token);
				},
				Err(e) => {
					obs::record_token_attempt(RequestOutcome::Failure);
					obs::trace_token_attempt_failure(attempt, self.max_attempts, &e);

					if attempt >= self.max_attempts {
						return Err(AuthenticationError::RetriesExhausted {
							attempts: attempt,
							source: e,
						});
					}
				},
			}
		}
	}

	fn request_token<C>(
		&self,
		http_client: &C,
		timeout: Option<Duration>,
	) -> Result<AccessToken, TokenFetchError>
	where
		C: ?Sized + FhirHttpClient,
	{
		let request = self.token_request()?;
		let response = http_client
			.execute(request, timeout)
			.map_err(|e| TokenFetchError::Transport(TransportError::network(e)))?;

		if !response.status().is_success() {
			return Err(TokenFetchError::UnexpectedStatus { status: response.status().as_u16() });
		}

		let mut deserializer = serde_json::Deserializer::from_slice(response.body());
		let parsed: TokenResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| TokenFetchError::InvalidJson { source })?;
		let token = parsed
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or(TokenFetchError::MissingAccessToken)?;

		// RFC 6750 b64token characters are all visible ASCII.
		if !token.bytes().all(|b| b.is_ascii_graphic()) {
			return Err(TokenFetchError::InvalidAccessToken);
		}

		Ok(AccessToken::new(token))
	}

	fn token_request(&self) -> Result<HttpRequest, TokenFetchError> {
		let body = Serializer::new(String::new())
			.append_pair("client_id", &self.client_id)
			.append_pair("client_secret", self.client_secret.expose())
			.append_pair("grant_type", "client_credentials")
			.finish();
		let request = oauth2::http::Request::builder()
			.method(Method::POST)
			.uri(self.token_endpoint.as_str())
			.header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(header::ACCEPT, "application/json")
			.body(body.into_bytes())?;

		Ok(request)
	}
}
impl PartialEq for OAuth2Credentials {
	fn eq(&self, other: &Self) -> bool {
		self.token_endpoint == other.token_endpoint
			&& self.client_id == other.client_id
			&& self.client_secret == other.client_secret
	}
}
impl Eq for OAuth2Credentials {}

#[cfg(test)]
mod tests {
	// std
	use std::collections::VecDeque;
	// crates.io
	use parking_lot::Mutex;
	// self
	use super::*;
	use crate::http::HttpResponse;

	#[derive(Default)]
	struct ScriptedTokenEndpoint {
		replies: Mutex<VecDeque<(u16, &'static str)>>,
		requests: Mutex<Vec<HttpRequest>>,
	}
	impl ScriptedTokenEndpoint {
		fn new(replies: impl IntoIterator<Item = (u16, &'static str)>) -> Self {
			Self { replies: Mutex::new(replies.into_iter().collect()), ..Default::default() }
		}

		fn calls(&self) -> usize {
			self.requests.lock().len()
		}
	}
	impl FhirHttpClient for ScriptedTokenEndpoint {
		type TransportError = std::io::Error;

		fn execute(
			&self,
			request: HttpRequest,
			_timeout: Option<Duration>,
		) -> Result<HttpResponse, Self::TransportError> {
			self.requests.lock().push(request);

			let (status, body) = self
				.replies
				.lock()
				.pop_front()
				.ok_or_else(|| std::io::Error::other("script exhausted"))?;
			let mut response = HttpResponse::new(body.as_bytes().to_vec());

			*response.status_mut() =
				StatusCode::from_u16(status).expect("Scripted status should be valid.");

			Ok(response)
		}
	}

	fn credentials(max_attempts: u32) -> OAuth2Credentials {
		OAuth2Credentials::new("https://auth.example.com/token", "client", "s3cret")
			.expect("Test credentials should be valid.")
			.with_max_attempts(max_attempts)
			.expect("Test max_attempts should be valid.")
	}

	#[test]
	fn success_short_circuits_the_loop() {
		let endpoint = ScriptedTokenEndpoint::new([(200, r#"{"access_token":"first"}"#)]);
		let token = credentials(5).fetch_token(&endpoint, None).expect("First attempt succeeds.");

		assert_eq!(token.secret(), "first");
		assert_eq!(endpoint.calls(), 1);
	}

	#[test]
	fn token_request_uses_form_encoding() {
		let request = credentials(1).token_request().expect("Token request should build.");

		assert_eq!(request.method(), &Method::POST);
		assert_eq!(request.uri(), "https://auth.example.com/token");
		assert_eq!(
			request.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
			Some(FORM_CONTENT_TYPE)
		);
		assert_eq!(
			request.body().as_slice(),
			b"client_id=client&client_secret=s3cret&grant_type=client_credentials"
		);
	}

	#[test]
	fn every_failure_kind_counts_as_an_attempt() {
		let endpoint = ScriptedTokenEndpoint::new([
			(500, ""),
			(200, "not json"),
			(200, r#"{"token_type":"bearer"}"#),
			(200, r#"{"access_token":"fourth"}"#),
		]);
		let token = credentials(4).fetch_token(&endpoint, None).expect("Fourth attempt succeeds.");

		assert_eq!(token.secret(), "fourth");
		assert_eq!(endpoint.calls(), 4);
	}

	#[test]
	fn exhaustion_reports_the_last_failure() {
		let endpoint = ScriptedTokenEndpoint::new([(503, ""), (200, r#"{"access_token":""}"#)]);
		let err = credentials(2)
			.fetch_token(&endpoint, None)
			.expect_err("Both attempts fail.");

		assert!(matches!(
			err,
			AuthenticationError::RetriesExhausted {
				attempts: 2,
				source: TokenFetchError::MissingAccessToken
			}
		));
		assert_eq!(endpoint.calls(), 2);
	}

	#[test]
	fn transport_failures_are_retried() {
		let endpoint = ScriptedTokenEndpoint::default();
		let err = credentials(3)
			.fetch_token(&endpoint, None)
			.expect_err("Exhausted script yields transport errors.");

		assert!(matches!(
			err,
			AuthenticationError::RetriesExhausted {
				attempts: 3,
				source: TokenFetchError::Transport(_)
			}
		));
		assert_eq!(endpoint.calls(), 3);
	}

	#[test]
	fn equality_ignores_max_attempts() {
		assert_eq!(credentials(1), credentials(7));
		assert_ne!(
			credentials(1),
			OAuth2Credentials::new("https://auth.example.com/token", "client", "other")
				.expect("Test credentials should be valid.")
		);
	}

	#[test]
	fn construction_validates_inputs() {
		assert!(matches!(
			OAuth2Credentials::new("not a url", "client", "secret"),
			Err(ConfigError::InvalidUrl { .. })
		));
		assert!(matches!(
			OAuth2Credentials::new("https://auth.example.com/token", "", "secret"),
			Err(ConfigError::MissingField { field: "client_id" })
		));
		assert!(matches!(
			OAuth2Credentials::new("https://auth.example.com/token", "client", ""),
			Err(ConfigError::MissingField { field: "client_secret" })
		));
		assert!(matches!(credentials(1).with_max_attempts(0), Err(ConfigError::ZeroMaxAttempts)));
	}
}

//! Client-level error types shared across auth, transport, and response handling.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Request signing failed; the resource request was not sent.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Server response did not match the expected FHIR JSON shape.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
}

/// Configuration and validation failures raised while building clients or requests.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A configured or derived URL cannot be parsed.
	#[error("The {field} URL is invalid.")]
	InvalidUrl {
		/// Which URL failed to parse.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A base URL that cannot carry a path (e.g. `mailto:`) or carries a query or fragment.
	#[error("The base URL `{url}` cannot be used as a FHIR endpoint.")]
	UnsupportedBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// Required credential field is missing or empty.
	#[error("The {field} field is required.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
	/// OAuth2 strategies need at least one token attempt.
	#[error("The max_attempts value must be at least 1.")]
	ZeroMaxAttempts,
	/// Default header name is not a valid HTTP header name.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
	},
	/// Default header value is not a valid HTTP header value.
	#[error("Value for header `{name}` is invalid.")]
	InvalidHeaderValue {
		/// Header whose value was rejected.
		name: String,
	},
}

/// OAuth2 token acquisition failed for every permitted attempt.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// Every attempt failed; `source` is the failure of the final attempt.
	#[error("Token endpoint did not issue an access token after {attempts} attempt(s).")]
	RetriesExhausted {
		/// Number of token requests issued.
		attempts: u32,
		/// Failure observed on the last attempt.
		#[source]
		source: TokenFetchError,
	},
}

/// Failure of a single token endpoint attempt.
#[derive(Debug, ThisError)]
pub enum TokenFetchError {
	/// Request could not be built (should not happen for a validated endpoint).
	#[error("Token request could not be constructed.")]
	Request(#[from] oauth2::http::Error),
	/// Transport failed while calling the token endpoint.
	#[error("Network error occurred while calling the token endpoint.")]
	Transport(#[source] TransportError),
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint returned HTTP {status}.")]
	UnexpectedStatus {
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Token endpoint body was not the expected JSON object.
	#[error("Token endpoint returned malformed JSON.")]
	InvalidJson {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint JSON lacked a usable `access_token`.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Issued token contains characters that cannot travel in a bearer header.
	#[error("Token endpoint issued an access_token that is not a valid bearer credential.")]
	InvalidAccessToken,
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the FHIR server.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

/// Response or request payloads that do not fit the FHIR JSON contract.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// Response body is not valid JSON.
	#[error("Server returned a non-JSON body (HTTP {status}).")]
	InvalidJson {
		/// HTTP status code of the response.
		status: u16,
		/// Parser failure.
		#[source]
		source: serde_json::Error,
	},
	/// Response JSON has `total`/`link` members of the wrong shape.
	#[error("Server returned a malformed FHIR envelope.")]
	MalformedEnvelope {
		/// Path to the offending member.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be encoded as JSON.")]
	EncodeBody {
		/// Serializer failure.
		#[source]
		source: serde_json::Error,
	},
	/// A stored pagination link cannot be resolved to a URL.
	#[error("Pagination link `{link}` is not a valid URL.")]
	InvalidLink {
		/// Link as returned by the server.
		link: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

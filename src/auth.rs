//! Request signing strategies: HTTP Basic and OAuth 2.0 client credentials.

pub mod basic;
pub mod client_credentials;
pub mod secret;

pub use basic::*;
pub use client_credentials::*;
pub use secret::*;

// crates.io
use oauth2::AccessToken;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{FhirHttpClient, HttpRequest},
};

/// Authentication mode labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthKind {
	/// Static username/password.
	Basic,
	/// Bearer token fetched through the client-credentials grant.
	OAuth2,
}
impl AuthKind {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthKind::Basic => "basic",
			AuthKind::OAuth2 => "oauth2",
		}
	}
}
impl Display for AuthKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How outbound requests are authenticated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthStrategy {
	/// `Authorization: Basic ...` built from a static credential pair.
	Basic(BasicCredentials),
	/// `Authorization: Bearer ...` with a token fetched for every request.
	OAuth2(OAuth2Credentials),
}
impl AuthStrategy {
	/// Shorthand for [`BasicCredentials::new`] wrapped in [`AuthStrategy::Basic`].
	pub fn basic(
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Result<Self, ConfigError> {
		Ok(Self::Basic(BasicCredentials::new(username, password)?))
	}

	/// Shorthand for [`OAuth2Credentials::new`] wrapped in [`AuthStrategy::OAuth2`].
	pub fn oauth2(
		token_endpoint: &str,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		Ok(Self::OAuth2(OAuth2Credentials::new(token_endpoint, client_id, client_secret)?))
	}

	/// Returns which authentication mode is configured.
	pub fn kind(&self) -> AuthKind {
		match self {
			Self::Basic(_) => AuthKind::Basic,
			Self::OAuth2(_) => AuthKind::OAuth2,
		}
	}

	/// Sets the `Authorization` header on `request`.
	///
	/// OAuth2 strategies call the token endpoint through `http_client` first and fail with
	/// [`Error::Authentication`] when no token could be obtained, in which case the request
	/// must not be sent.
	pub fn sign<C>(
		&self,
		mut request: HttpRequest,
		http_client: &C,
		timeout: Option<Duration>,
	) -> Result<HttpRequest>
	where
		C: ?Sized + FhirHttpClient,
	{
		let value = match self {
			Self::Basic(credentials) => credentials.header_value()?,
			Self::OAuth2(credentials) => {
				let token = credentials.fetch_token(http_client, timeout)?;

				bearer_header(&token)?
			},
		};

		request.headers_mut().insert(header::AUTHORIZATION, value);

		Ok(request)
	}
}
impl From<BasicCredentials> for AuthStrategy {
	fn from(value: BasicCredentials) -> Self {
		Self::Basic(value)
	}
}
impl From<OAuth2Credentials> for AuthStrategy {
	fn from(value: OAuth2Credentials) -> Self {
		Self::OAuth2(value)
	}
}

fn bearer_header(token: &AccessToken) -> Result<HeaderValue, ConfigError> {
	let mut value = HeaderValue::from_str(&format!("Bearer {}", token.secret()))
		.map_err(|_| ConfigError::InvalidHeaderValue { name: header::AUTHORIZATION.to_string() })?;

	value.set_sensitive(true);

	Ok(value)
}

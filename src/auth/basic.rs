//! HTTP Basic credentials.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Static username/password pair sent with every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicCredentials {
	username: String,
	password: Secret,
}
impl BasicCredentials {
	/// Validates and stores the credential pair; both parts must be non-empty.
	pub fn new(
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let username = username.into();
		let password = Secret::new(password);

		if username.is_empty() {
			return Err(ConfigError::MissingField { field: "username" });
		}
		if password.is_empty() {
			return Err(ConfigError::MissingField { field: "password" });
		}

		Ok(Self { username, password })
	}

	/// Username sent in the credential pair.
	pub fn username(&self) -> &str {
		&self.username
	}

	/// Renders `Basic base64(username:password)` as a sensitive header value.
	pub fn header_value(&self) -> Result<HeaderValue, ConfigError> {
		let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password.expose()));
		let mut value = HeaderValue::from_str(&format!("Basic {encoded}")).map_err(|_| {
			ConfigError::InvalidHeaderValue { name: header::AUTHORIZATION.to_string() }
		})?;

		value.set_sensitive(true);

		Ok(value)
	}
}

// std
use std::iter::IntoIterator;
// self
use crate::{
	_prelude::*,
	auth::AuthStrategy,
	client::{DeleteMode, FhirClient},
	error::ConfigError,
	http::FhirHttpClient,
	pagination::PaginationState,
};

/// Media type sent as `Content-Type` and `Accept` unless overridden.
pub const FHIR_JSON: &str = "application/fhir+json";
/// Per-request timeout applied unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for [`FhirClient`] values.
pub struct FhirClientBuilder<C>
where
	C: ?Sized + FhirHttpClient,
{
	/// Server base URL, e.g. `https://fhir.example.com/r4`.
	pub base_url: String,
	/// Optional signing strategy.
	pub auth: Option<AuthStrategy>,
	/// Header overrides applied on top of the FHIR JSON defaults.
	pub headers: Vec<(String, String)>,
	/// Per-request timeout handed to the transport.
	pub timeout: Option<Duration>,
	/// What [`FhirClient::delete`] returns.
	pub delete_mode: DeleteMode,
	http_client: Arc<C>,
}
impl<C> FhirClientBuilder<C>
where
	C: ?Sized + FhirHttpClient,
{
	/// Creates a new builder for `base_url` using the provided transport.
	pub fn new(base_url: impl Into<String>, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			base_url: base_url.into(),
			auth: None,
			headers: Vec::new(),
			timeout: Some(DEFAULT_TIMEOUT),
			delete_mode: DeleteMode::default(),
			http_client: http_client.into(),
		}
	}

	/// Swaps the transport, keeping every other setting.
	pub fn http_client<D>(self, http_client: impl Into<Arc<D>>) -> FhirClientBuilder<D>
	where
		D: ?Sized + FhirHttpClient,
	{
		FhirClientBuilder {
			base_url: self.base_url,
			auth: self.auth,
			headers: self.headers,
			timeout: self.timeout,
			delete_mode: self.delete_mode,
			http_client: http_client.into(),
		}
	}

	/// Signs every request with `auth`.
	pub fn auth(mut self, auth: impl Into<AuthStrategy>) -> Self {
		self.auth = Some(auth.into());

		self
	}

	/// Adds or overrides one default header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Adds or overrides several default headers.
	pub fn headers<I, K, V>(mut self, headers: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		for (name, value) in headers.into_iter() {
			self.headers.push((name.into(), value.into()));
		}

		self
	}

	/// Overrides the per-request timeout (defaults to 10 seconds).
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Leaves the timeout entirely to the transport's own configuration.
	pub fn no_timeout(mut self) -> Self {
		self.timeout = None;

		self
	}

	/// Chooses whether `delete` returns the parsed body or only the status code.
	pub fn delete_mode(mut self, mode: DeleteMode) -> Self {
		self.delete_mode = mode;

		self
	}

	/// Consumes the builder and validates the resulting client.
	pub fn build(self) -> Result<FhirClient<C>, ConfigError> {
		if self.base_url.is_empty() {
			return Err(ConfigError::MissingField { field: "base_url" });
		}

		let base_url = Url::parse(&self.base_url)
			.map_err(|source| ConfigError::InvalidUrl { field: "base", source })?;

		if base_url.cannot_be_a_base()
			|| base_url.query().is_some()
			|| base_url.fragment().is_some()
		{
			return Err(ConfigError::UnsupportedBaseUrl { url: self.base_url });
		}

		let headers = default_headers(&self.headers)?;

		Ok(FhirClient {
			base_url,
			auth: self.auth,
			headers,
			timeout: self.timeout,
			delete_mode: self.delete_mode,
			http_client: self.http_client,
			pagination: PaginationState::default(),
		})
	}
}

impl<C> Debug for FhirClientBuilder<C>
where
	C: ?Sized + FhirHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FhirClientBuilder")
			.field("base_url", &self.base_url)
			.field("auth", &self.auth)
			.field("headers", &self.headers)
			.field("timeout", &self.timeout)
			.field("delete_mode", &self.delete_mode)
			.finish()
	}
}

fn default_headers(overrides: &[(String, String)]) -> Result<HeaderMap, ConfigError> {
	let mut headers = HeaderMap::new();

	headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(FHIR_JSON));
	headers.insert(header::ACCEPT, HeaderValue::from_static(FHIR_JSON));

	for (name, value) in overrides {
		let header_name = HeaderName::from_bytes(name.as_bytes())
			.map_err(|_| ConfigError::InvalidHeaderName { name: name.clone() })?;
		let header_value = HeaderValue::from_str(value)
			.map_err(|_| ConfigError::InvalidHeaderValue { name: name.clone() })?;

		headers.insert(header_name, header_value);
	}

	Ok(headers)
}

//! FHIR resource client: CRUD verbs, request signing, and pagination tracking.
//!
//! Every verb builds `base_url + "/" + path`, signs the request through the configured
//! [`AuthStrategy`], sends it with the client's default headers and timeout, parses the
//! body as JSON, and folds the response's `total` and `link` members into the client's
//! [`PaginationState`]. Calls block until the exchange completes. Pagination state is
//! mutated through `&mut self`, so a client shared between threads must be wrapped in a
//! lock by the caller.

/// Builder API for assembling FHIR clients.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::AuthStrategy,
	error::{ConfigError, ProtocolError, TransportError},
	http::{FhirHttpClient, HttpResponse},
	obs::{self, RequestOutcome, RequestSpan},
	pagination::{LinkRelation, PaginationState},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestFhirClient = FhirClient<ReqwestHttpClient>;

/// What [`FhirClient::delete`] hands back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeleteMode {
	/// Parse the response body like any other verb.
	#[default]
	Body,
	/// Skip body parsing and return only the HTTP status.
	Status,
}

/// Result of [`FhirClient::delete`], shaped by the configured [`DeleteMode`].
#[derive(Clone, Debug, PartialEq)]
pub enum DeleteResponse {
	/// Parsed response body.
	Body(Value),
	/// Transport status code.
	Status(StatusCode),
}

/// Parsed response returned by [`FhirClient::execute`].
#[derive(Clone, Debug, PartialEq)]
pub struct FhirResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Parsed JSON body.
	pub body: Value,
}

/// Blocking client for one FHIR server base URL.
pub struct FhirClient<C>
where
	C: ?Sized + FhirHttpClient,
{
	base_url: Url,
	auth: Option<AuthStrategy>,
	headers: HeaderMap,
	timeout: Option<Duration>,
	delete_mode: DeleteMode,
	http_client: Arc<C>,
	pagination: PaginationState,
}
#[cfg(feature = "reqwest")]
impl FhirClient<ReqwestHttpClient> {
	/// Starts a builder backed by a default reqwest blocking transport.
	pub fn builder(base_url: impl Into<String>) -> FhirClientBuilder<ReqwestHttpClient> {
		FhirClientBuilder::new(base_url, ReqwestHttpClient::default())
	}
}
impl<C> FhirClient<C>
where
	C: ?Sized + FhirHttpClient,
{
	/// Starts a builder that reuses the caller-provided transport.
	pub fn builder_with_http_client(
		base_url: impl Into<String>,
		http_client: impl Into<Arc<C>>,
	) -> FhirClientBuilder<C> {
		FhirClientBuilder::new(base_url, http_client)
	}

	/// Server base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Configured signing strategy, if any.
	pub fn auth(&self) -> Option<&AuthStrategy> {
		self.auth.as_ref()
	}

	/// Default headers attached to every resource request.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Per-request timeout passed to the transport.
	pub fn timeout(&self) -> Option<Duration> {
		self.timeout
	}

	/// Links and total observed so far.
	pub fn pagination(&self) -> &PaginationState {
		&self.pagination
	}

	/// Result-set size from the most recent response that reported one.
	pub fn total(&self) -> Option<u64> {
		self.pagination.total
	}

	/// True when the latest link-bearing response had a `next` link.
	pub fn has_next(&self) -> bool {
		self.pagination.has_next()
	}

	/// True when the latest link-bearing response had a `previous` link.
	pub fn has_previous(&self) -> bool {
		self.pagination.has_previous()
	}

	/// True when the latest link-bearing response had a `self` link.
	pub fn has_self(&self) -> bool {
		self.pagination.has_self()
	}

	/// Reads a resource or runs a search, e.g. `get("Patient", &[("name", "Smith")])`.
	pub fn get(&mut self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
		Ok(self.execute(Method::GET, path, None, query)?.body)
	}

	/// Creates a resource.
	pub fn post<B>(&mut self, path: &str, body: &B, query: &[(&str, &str)]) -> Result<Value>
	where
		B: ?Sized + Serialize,
	{
		let body = encode_body(body)?;

		Ok(self.execute_bytes(Method::POST, path, Some(body), query)?.body)
	}

	/// Updates (or upserts) a resource.
	pub fn put<B>(&mut self, path: &str, body: &B, query: &[(&str, &str)]) -> Result<Value>
	where
		B: ?Sized + Serialize,
	{
		let body = encode_body(body)?;

		Ok(self.execute_bytes(Method::PUT, path, Some(body), query)?.body)
	}

	/// Deletes a resource; the return shape follows the configured [`DeleteMode`].
	pub fn delete(&mut self, path: &str, query: &[(&str, &str)]) -> Result<DeleteResponse> {
		match self.delete_mode {
			DeleteMode::Body =>
				Ok(DeleteResponse::Body(self.execute(Method::DELETE, path, None, query)?.body)),
			DeleteMode::Status => {
				let url = self.resource_url(path, query)?;
				let response = self.send(Method::DELETE, url, Vec::new())?;

				Ok(DeleteResponse::Status(response.status()))
			},
		}
	}

	/// Sends an arbitrary verb against `path` and applies the usual response handling.
	pub fn execute(
		&mut self,
		method: Method,
		path: &str,
		body: Option<&Value>,
		query: &[(&str, &str)],
	) -> Result<FhirResponse> {
		let body = body.map(encode_body).transpose()?;

		self.execute_bytes(method, path, body, query)
	}

	/// Follows the stored `next` link; `Ok(None)` when there is none.
	pub fn next_page(&mut self) -> Result<Option<Value>> {
		self.follow(LinkRelation::Next)
	}

	/// Follows the stored `previous` link; `Ok(None)` when there is none.
	pub fn previous_page(&mut self) -> Result<Option<Value>> {
		self.follow(LinkRelation::Previous)
	}

	/// Re-fetches the stored `self` link; `Ok(None)` when there is none.
	pub fn self_page(&mut self) -> Result<Option<Value>> {
		self.follow(LinkRelation::SelfLink)
	}

	fn follow(&mut self, relation: LinkRelation) -> Result<Option<Value>> {
		let url = match self.pagination.link(relation) {
			Some(link) => self.resolve_link(link)?,
			None => return Ok(None),
		};

		Ok(Some(self.dispatch(Method::GET, url, Vec::new())?.body))
	}

	fn execute_bytes(
		&mut self,
		method: Method,
		path: &str,
		body: Option<Vec<u8>>,
		query: &[(&str, &str)],
	) -> Result<FhirResponse> {
		let url = self.resource_url(path, query)?;

		self.dispatch(method, url, body.unwrap_or_default())
	}

	fn dispatch(&mut self, method: Method, url: Url, body: Vec<u8>) -> Result<FhirResponse> {
		let response = self.send(method, url, body)?;
		let status = response.status();
		let body: Value = serde_json::from_slice(response.body())
			.map_err(|source| ProtocolError::InvalidJson { status: status.as_u16(), source })?;

		self.pagination.apply_envelope(&body)?;

		Ok(FhirResponse { status, body })
	}

	fn send(&self, method: Method, url: Url, body: Vec<u8>) -> Result<HttpResponse> {
		let _span = RequestSpan::new(&method, "send").entered();

		obs::record_request_outcome(&method, RequestOutcome::Attempt);

		let result = self.sign_and_send(&method, url, body);

		match &result {
			Ok(_) => obs::record_request_outcome(&method, RequestOutcome::Success),
			Err(_) => obs::record_request_outcome(&method, RequestOutcome::Failure),
		}

		result
	}

	fn sign_and_send(&self, method: &Method, url: Url, body: Vec<u8>) -> Result<HttpResponse> {
		let mut request = oauth2::http::Request::builder()
			.method(method.clone())
			.uri(url.as_str())
			.body(body)
			.map_err(ConfigError::from)?;

		*request.headers_mut() = self.headers.clone();

		if let Some(auth) = &self.auth {
			request = auth.sign(request, self.http_client.as_ref(), self.timeout)?;
		}

		self.http_client
			.execute(request, self.timeout)
			.map_err(|e| TransportError::network(e).into())
	}

	fn resource_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ConfigError> {
		let raw = format!(
			"{}/{}",
			self.base_url.as_str().trim_end_matches('/'),
			path.trim_start_matches('/')
		);
		let mut url = Url::parse(&raw)
			.map_err(|source| ConfigError::InvalidUrl { field: "resource", source })?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query.iter().copied());
		}

		Ok(url)
	}

	fn resolve_link(&self, link: &str) -> Result<Url, ProtocolError> {
		match Url::parse(link) {
			Ok(url) => Ok(url),
			Err(url::ParseError::RelativeUrlWithoutBase) => {
				let mut base = self.base_url.clone();

				if !base.path().ends_with('/') {
					let path = format!("{}/", base.path());

					base.set_path(&path);
				}

				base.join(link)
					.map_err(|source| ProtocolError::InvalidLink { link: link.to_owned(), source })
			},
			Err(source) => Err(ProtocolError::InvalidLink { link: link.to_owned(), source }),
		}
	}
}
impl<C> Debug for FhirClient<C>
where
	C: ?Sized + FhirHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FhirClient")
			.field("base_url", &self.base_url.as_str())
			.field("auth", &self.auth.as_ref().map(AuthStrategy::kind))
			.field("timeout", &self.timeout)
			.field("delete_mode", &self.delete_mode)
			.field("pagination", &self.pagination)
			.finish()
	}
}

fn encode_body<B>(body: &B) -> Result<Vec<u8>, ProtocolError>
where
	B: ?Sized + Serialize,
{
	serde_json::to_vec(body).map_err(|source| ProtocolError::EncodeBody { source })
}

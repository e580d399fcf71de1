//! Token request orchestration.
//!
//! [`TokenRequester`] resolves the realm, builds the token endpoint URL, sends the grant as a
//! single form-encoded POST, and classifies whatever comes back. It holds no per-request
//! state, so one requester (or any number of clones) can serve concurrent calls.

// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest, HttpResponse,
	http::{
		Method,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	endpoint::{self, DEFAULT_REALM},
	error::ConfigError,
	grant::GrantRequest,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, RequestOutcome, RequestSpan},
	token::{ErrorResponse, TokenResponse},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

#[cfg(feature = "reqwest")]
/// Requester specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenRequester = TokenRequester<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Requests a token from `{base_url}/realms/{realm}/protocol/openid-connect/token`.
///
/// Uses a fresh reqwest transport and the `master` realm unless the grant names another one.
/// See [`TokenRequester::request_token`] for the outcome mapping.
#[cfg(feature = "reqwest")]
pub async fn request_token(base_url: &str, grant: &GrantRequest) -> Result<TokenResponse> {
	ReqwestTokenRequester::new().request_token(base_url, grant).await
}

/// Issues token requests through a pluggable transport.
pub struct TokenRequester<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Realm used when a grant does not name one.
	pub default_realm: String,
}
impl<C, M> TokenRequester<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a requester that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(http_client: impl Into<Arc<C>>, mapper: impl Into<Arc<M>>) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			default_realm: DEFAULT_REALM.into(),
		}
	}

	/// Replaces the realm used when a grant does not name one.
	pub fn with_default_realm(mut self, realm: impl Into<String>) -> Self {
		self.default_realm = realm.into();

		self
	}

	/// Sends `grant` to the token endpoint of the server rooted at `base_url`.
	///
	/// `base_url` is the server root including its mount path (e.g.
	/// `http://127.0.0.1:8080/auth`), without realm or endpoint path.
	///
	/// # Outcomes
	///
	/// - 2xx with a JSON token object resolves with the full [`TokenResponse`].
	/// - 2xx with a non-JSON body fails with [`Error::UnexpectedBody`].
	/// - 2xx with JSON lacking `access_token` fails with [`Error::TokenResponseParse`].
	/// - Any other status with a JSON `error` object fails with [`Error::Protocol`].
	/// - Any other status with any other body fails with [`Error::Routing`].
	/// - No response at all fails with [`Error::Transport`].
	///
	/// The request is sent exactly once; nothing is retried or logged.
	pub async fn request_token(&self, base_url: &str, grant: &GrantRequest) -> Result<TokenResponse> {
		let span = RequestSpan::new(grant.grant_type(), "request_token");

		obs::record_request_outcome(grant.grant_type(), RequestOutcome::Attempt);

		let result = span.instrument(self.send(base_url, grant)).await;

		match &result {
			Ok(_) => obs::record_request_outcome(grant.grant_type(), RequestOutcome::Success),
			Err(_) => obs::record_request_outcome(grant.grant_type(), RequestOutcome::Failure),
		}

		result
	}

	async fn send(&self, base_url: &str, grant: &GrantRequest) -> Result<TokenResponse> {
		let realm = grant.realm_name().unwrap_or(self.default_realm.as_str());
		let url = endpoint::token_endpoint(base_url, realm)?;
		let request = build_request(&url, grant)?;
		let handle = self.http_client.handle();
		let response = handle
			.call(request)
			.await
			.map_err(|err| self.transport_mapper.map_transport_error(grant.grant_type(), err))?;

		classify_response(response)
	}
}
#[cfg(feature = "reqwest")]
impl TokenRequester<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a requester backed by a default reqwest client.
	pub fn new() -> Self {
		Self::with_http_client(ReqwestHttpClient::default(), ReqwestTransportErrorMapper)
	}
}
#[cfg(feature = "reqwest")]
impl Default for TokenRequester<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	fn default() -> Self {
		Self::new()
	}
}
impl<C, M> Clone for TokenRequester<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			default_realm: self.default_realm.clone(),
		}
	}
}
impl<C, M> Debug for TokenRequester<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRequester").field("default_realm", &self.default_realm).finish()
	}
}

fn build_request(url: &Url, grant: &GrantRequest) -> Result<HttpRequest> {
	oauth2::http::Request::builder()
		.method(Method::POST)
		.uri(url.as_str())
		.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
		.header(ACCEPT, JSON_CONTENT_TYPE)
		.body(grant.to_form_body().into_bytes())
		.map_err(|err| ConfigError::from(err).into())
}

/// Maps a received HTTP response onto the token or error payload it carries.
pub(crate) fn classify_response(response: HttpResponse) -> Result<TokenResponse> {
	let status = response.status();
	let code = status.as_u16();
	let body = response.into_body();

	if status.is_success() {
		let Ok(value) = serde_json::from_slice::<serde_json::Value>(&body) else {
			return Err(Error::UnexpectedBody { status: code, body: body_text(body) });
		};

		return TokenResponse::from_json(value)
			.map_err(|source| Error::TokenResponseParse { source, status: code });
	}

	match serde_json::from_slice::<ErrorResponse>(&body) {
		Ok(response) => Err(Error::Protocol { status: code, response }),
		Err(_) => Err(Error::Routing { status: code, body: body_text(body) }),
	}
}

fn body_text(body: Vec<u8>) -> String {
	String::from_utf8(body)
		.unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

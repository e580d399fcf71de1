// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	io::{Error as IoError, ErrorKind},
	pin::Pin,
	sync::{Arc, Mutex},
};
// self
use keycloak_token_request::{
	Error, GrantRequest, GrantType, TokenRequester,
	error::{TransportError, TransportErrorCode},
	http::TokenHttpClient,
	oauth::{
		TransportErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::header::CONTENT_TYPE,
		},
	},
};

#[derive(Debug)]
struct FakeTransportError;
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Fake transport failure.")
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
enum Behavior {
	Respond(&'static str),
	Fail(ErrorKind),
}

#[derive(Clone, Debug)]
struct SentRequest {
	method: String,
	uri: String,
	content_type: Option<String>,
	body: String,
}
impl From<HttpRequest> for SentRequest {
	fn from(request: HttpRequest) -> Self {
		Self {
			method: request.method().to_string(),
			uri: request.uri().to_string(),
			content_type: request
				.headers()
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned),
			body: String::from_utf8_lossy(request.body()).into_owned(),
		}
	}
}

#[derive(Clone)]
struct FakeHttpClient {
	behavior: Behavior,
	sent: Arc<Mutex<Vec<SentRequest>>>,
}
impl FakeHttpClient {
	fn new(behavior: Behavior) -> Self {
		Self { behavior, sent: Default::default() }
	}

	fn sent(&self) -> Vec<SentRequest> {
		self.sent.lock().expect("Fake transport lock should not be poisoned.").clone()
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn handle(&self) -> Self::Handle {
		FakeHttpHandle { behavior: self.behavior, sent: self.sent.clone() }
	}
}

struct FakeHttpHandle {
	behavior: Behavior,
	sent: Arc<Mutex<Vec<SentRequest>>>,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let behavior = self.behavior;
		let sent = self.sent.clone();

		Box::pin(async move {
			sent.lock().expect("Fake transport lock should not be poisoned.").push(request.into());

			match behavior {
				Behavior::Respond(body) => Ok(HttpResponse::new(body.as_bytes().to_vec())),
				Behavior::Fail(kind) => Err(HttpClientError::Io(IoError::from(kind))),
			}
		})
	}
}

#[derive(Default)]
struct RecordingTransportErrorMapper {
	grants: Mutex<Vec<GrantType>>,
}
impl RecordingTransportErrorMapper {
	fn recorded_grants(&self) -> Vec<GrantType> {
		self.grants.lock().expect("Mapper lock should not be poisoned.").clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		grant: &GrantType,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		self.grants.lock().expect("Mapper lock should not be poisoned.").push(grant.clone());

		match err {
			HttpClientError::Io(inner) => TransportError::from(inner).into(),
			HttpClientError::Reqwest(inner) => TransportError::classified(*inner).into(),
			other => TransportError::new(TransportErrorCode::Other, other.to_string()).into(),
		}
	}
}

#[tokio::test]
async fn custom_transport_receives_verbatim_form() {
	let http_client = Arc::new(FakeHttpClient::new(Behavior::Respond(
		"{\"access_token\":\"fake-access\",\"token_type\":\"bearer\"}",
	)));
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let requester: TokenRequester<FakeHttpClient, RecordingTransportErrorMapper> =
		TokenRequester::with_http_client(http_client.clone(), mapper.clone());
	let grant = GrantRequest::new("urn:ietf:params:oauth:grant-type:token-exchange")
		.param("client_id", "gateway")
		.param("subject_token", "eyJzdWJqZWN0")
		.realm("edge");
	let token = requester
		.request_token("https://sso.example.com/auth", &grant)
		.await
		.expect("Canned token payload should resolve.");

	assert_eq!(token.access_token.expose(), "fake-access");
	assert!(mapper.recorded_grants().is_empty());

	let sent = http_client.sent();

	assert_eq!(sent.len(), 1);

	let request = &sent[0];

	assert_eq!(request.method, "POST");
	assert_eq!(request.uri, "https://sso.example.com/auth/realms/edge/protocol/openid-connect/token");
	assert_eq!(request.content_type.as_deref(), Some("application/x-www-form-urlencoded"));
	assert_eq!(
		request.body,
		"grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Atoken-exchange&client_id=gateway&subject_token=eyJzdWJqZWN0"
	);
}

#[tokio::test]
async fn custom_mapper_classifies_transport_failures() {
	let http_client = Arc::new(FakeHttpClient::new(Behavior::Fail(ErrorKind::ConnectionReset)));
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let requester: TokenRequester<FakeHttpClient, RecordingTransportErrorMapper> =
		TokenRequester::with_http_client(http_client, mapper.clone());
	let err = requester
		.request_token("http://127.0.0.1:8080/auth", &GrantRequest::password("admin-cli", "a", "b"))
		.await
		.expect_err("Reset connection should fail.");

	assert_eq!(err.transport_code(), Some(TransportErrorCode::ConnectionReset));
	assert_eq!(err.status(), None);
	assert_eq!(mapper.recorded_grants(), vec![GrantType::Password]);
}

#[tokio::test]
async fn invalid_base_url_fails_before_sending() {
	let http_client = Arc::new(FakeHttpClient::new(Behavior::Respond("{}")));
	let requester: TokenRequester<FakeHttpClient, RecordingTransportErrorMapper> =
		TokenRequester::with_http_client(
			http_client.clone(),
			RecordingTransportErrorMapper::default(),
		);
	let err = requester
		.request_token("127.0.0.1:8080/auth", &GrantRequest::client_credentials("svc", "secret"))
		.await
		.expect_err("Base URL without a usable scheme should fail.");

	assert!(matches!(err, Error::Config(_)));
	assert!(http_client.sent().is_empty());
}

#[cfg(feature = "reqwest")]
#[tokio::test]
async fn unreachable_port_rejects_with_connection_refused() {
	let listener = std::net::TcpListener::bind("127.0.0.1:0")
		.expect("Binding an ephemeral local port should succeed.");
	let port = listener.local_addr().expect("Bound listener should expose its address.").port();

	drop(listener);

	let grant = GrantRequest::password("admin-cli", "admin", "admin");
	let err = keycloak_token_request::request_token(&format!("http://127.0.0.1:{port}/auth"), &grant)
		.await
		.expect_err("Closed port should refuse the connection.");

	match &err {
		Error::Transport(inner) => {
			assert_eq!(inner.code().as_str(), "ECONNREFUSED");
			assert!(inner.inner().is::<keycloak_token_request::reqwest::Error>());
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

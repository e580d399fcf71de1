//! Error taxonomy for token requests.
//!
//! Every failure mode surfaces as its own [`Error`] variant so callers branch on the
//! variant instead of probing the payload shape: transport failures carry a machine code,
//! structured OAuth rejections carry the server's JSON, and unstructured responses carry the
//! raw body text.

// self
use crate::{_prelude::*, token::ErrorResponse};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error returned by token requests.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; no request was sent.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Connection could not be established or the exchange was cut short.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Server answered with a non-success status and a structured OAuth error body.
	#[error("Token endpoint rejected the request with HTTP {status}: {response}.")]
	Protocol {
		/// HTTP status code returned by the server.
		status: u16,
		/// Error payload exactly as the server sent it.
		response: ErrorResponse,
	},
	/// Server answered with a non-success status and a body that is not an OAuth error.
	#[error("Token endpoint returned HTTP {status} with an unstructured body.")]
	Routing {
		/// HTTP status code returned by the server.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Server answered with a success status but the body is not JSON.
	#[error("Token endpoint returned HTTP {status} with a body that is not JSON.")]
	UnexpectedBody {
		/// HTTP status code returned by the server.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Server answered with a success status and JSON that is not a token response.
	#[error("Token endpoint returned JSON that is not a token response.")]
	TokenResponseParse {
		/// Structured decoding failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code returned by the server.
		status: u16,
	},
}
impl Error {
	/// HTTP status code, when the server answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Protocol { status, .. }
			| Self::Routing { status, .. }
			| Self::UnexpectedBody { status, .. }
			| Self::TokenResponseParse { status, .. } => Some(*status),
			Self::Config(_) | Self::Transport(_) => None,
		}
	}

	/// Machine-readable transport code for connection-level failures.
	pub fn transport_code(&self) -> Option<TransportErrorCode> {
		match self {
			Self::Transport(err) => Some(err.code()),
			_ => None,
		}
	}

	/// Structured OAuth error returned by the server, if any.
	pub fn oauth_error(&self) -> Option<&ErrorResponse> {
		match self {
			Self::Protocol { response, .. } => Some(response),
			_ => None,
		}
	}

	/// Raw response body for failures whose payload could not be structured.
	pub fn raw_body(&self) -> Option<&str> {
		match self {
			Self::Routing { body, .. } | Self::UnexpectedBody { body, .. } => Some(body),
			_ => None,
		}
	}
}

/// Local failures raised before a request reaches the network.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL parses but cannot carry a path (e.g. `mailto:` or `data:` URLs).
	#[error("Base URL `{url}` cannot carry the token endpoint path.")]
	CannotBeABase {
		/// Offending base URL.
		url: String,
	},
	/// Realm name resolved to an empty string.
	#[error("Realm name must not be empty.")]
	EmptyRealm,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Machine-readable connection failure codes, spelled the way socket APIs report them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportErrorCode {
	/// Nothing listens on the target host/port.
	ConnectionRefused,
	/// Peer reset or aborted the connection mid-exchange.
	ConnectionReset,
	/// Connect or read timed out.
	TimedOut,
	/// Host name could not be resolved.
	HostNotFound,
	/// Connection failed for a reason not covered above.
	Connect,
	/// Transport failed after connecting or for an unrecognized reason.
	Other,
}
impl TransportErrorCode {
	/// Returns the errno-style label (e.g. `ECONNREFUSED`).
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ConnectionRefused => "ECONNREFUSED",
			Self::ConnectionReset => "ECONNRESET",
			Self::TimedOut => "ETIMEDOUT",
			Self::HostNotFound => "ENOTFOUND",
			Self::Connect => "ECONNECT",
			Self::Other => "EUNKNOWN",
		}
	}

	/// Classifies an error by walking its source chain.
	///
	/// The first [`std::io::Error`] with a recognized kind wins. Resolver failures are
	/// detected by the `dns error` prefix hyper puts on them.
	pub fn classify(error: &(dyn StdError + 'static)) -> Self {
		let mut current = Some(error);
		let mut dns = false;

		while let Some(err) = current {
			if let Some(io) = err.downcast_ref::<std::io::Error>() {
				match io.kind() {
					std::io::ErrorKind::ConnectionRefused => return Self::ConnectionRefused,
					std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted =>
						return Self::ConnectionReset,
					std::io::ErrorKind::TimedOut => return Self::TimedOut,
					_ => (),
				}
			}
			if err.to_string().starts_with("dns error") {
				dns = true;
			}

			current = err.source();
		}

		if dns { Self::HostNotFound } else { Self::Other }
	}
}
impl Display for TransportErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Connection-level failure; the underlying transport error is kept untouched as `source`.
#[derive(Debug, ThisError)]
#[error("Transport failed while calling the token endpoint ({code}).")]
pub struct TransportError {
	code: TransportErrorCode,
	#[source]
	source: BoxError,
}
impl TransportError {
	/// Wraps a transport-specific error under the provided code.
	pub fn new(code: TransportErrorCode, source: impl Into<BoxError>) -> Self {
		Self { code, source: source.into() }
	}

	/// Wraps a transport error, deriving the code from its source chain.
	pub fn classified(src: impl 'static + Send + Sync + StdError) -> Self {
		let code = TransportErrorCode::classify(&src);

		Self::new(code, src)
	}

	/// Machine-readable failure code.
	pub fn code(&self) -> TransportErrorCode {
		self.code
	}

	/// Underlying transport error.
	pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
		self.source.as_ref()
	}
}
impl From<std::io::Error> for TransportError {
	fn from(e: std::io::Error) -> Self {
		Self::classified(e)
	}
}

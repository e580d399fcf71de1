//! Transport error mapping for token requests.

pub use oauth2;

// crates.io
use oauth2::HttpClientError;
// self
use crate::{_prelude::*, grant::GrantType};
#[cfg(feature = "reqwest")]
use crate::error::{ConfigError, TransportError, TransportErrorCode};

/// Maps HTTP transport failures into crate [`Error`] values.
///
/// Mappers only see failures where no HTTP response was received; responses of any status
/// are classified by the requester itself.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(&self, grant: &GrantType, error: HttpClientError<E>) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, grant: &GrantType, err: HttpClientError<ReqwestError>) -> Error {
		let _ = grant;

		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::from(inner).into(),
			HttpClientError::Other(message) =>
				TransportError::new(TransportErrorCode::Other, message).into(),
			_ => map_unknown_transport_error(),
		}
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::new(TransportErrorCode::TimedOut, err).into();
	}

	let code = match TransportErrorCode::classify(&err) {
		TransportErrorCode::Other if err.is_connect() => TransportErrorCode::Connect,
		code => code,
	};

	TransportError::new(code, err).into()
}

#[cfg(feature = "reqwest")]
fn map_unknown_transport_error() -> Error {
	TransportError::new(
		TransportErrorCode::Other,
		"HTTP client error occurred while calling the token endpoint.",
	)
	.into()
}

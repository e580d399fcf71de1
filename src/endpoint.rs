//! Token endpoint addressing.

// self
use crate::{_prelude::*, error::ConfigError};

/// Realm targeted when neither the grant nor the requester names one.
pub const DEFAULT_REALM: &str = "master";

const TOKEN_PATH: [&str; 3] = ["protocol", "openid-connect", "token"];

/// Builds `{base_url}/realms/{realm}/protocol/openid-connect/token`.
///
/// `base_url` is the server root including any mount path (for example
/// `http://127.0.0.1:8080/auth`); a trailing slash is tolerated. The realm is appended as a
/// single percent-encoded path segment.
pub fn token_endpoint(base_url: &str, realm: &str) -> Result<Url, ConfigError> {
	if realm.is_empty() {
		return Err(ConfigError::EmptyRealm);
	}

	let mut url = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

	url.path_segments_mut()
		.map_err(|_| ConfigError::CannotBeABase { url: base_url.to_owned() })?
		.pop_if_empty()
		.extend(["realms", realm])
		.extend(TOKEN_PATH);

	Ok(url)
}

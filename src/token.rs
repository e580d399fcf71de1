//! Token endpoint payloads.
//!
//! Only the fields callers branch on are typed. Everything else the server sends is kept
//! verbatim in an opaque JSON map, so a payload can be handed on exactly as received.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Access token string that never shows up in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Consumes the wrapper, returning the token value.
	pub fn into_inner(self) -> String {
		self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenSecret(<redacted>)")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Successful token endpoint payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Issued access token.
	pub access_token: TokenSecret,
	/// Remaining members (`expires_in`, `refresh_token`, `token_type`, ...) as sent.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl TokenResponse {
	/// Decodes a JSON document, reporting the failing path when it is not a token payload.
	pub fn from_json(value: Value) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		serde_path_to_error::deserialize(value)
	}

	/// Looks up any member other than `access_token`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.extra.get(key)
	}

	/// `token_type` member, when present as a string.
	pub fn token_type(&self) -> Option<&str> {
		self.get("token_type").and_then(Value::as_str)
	}

	/// `refresh_token` member, when present as a string.
	pub fn refresh_token(&self) -> Option<&str> {
		self.get("refresh_token").and_then(Value::as_str)
	}

	/// `scope` member, when present as a string.
	pub fn scope(&self) -> Option<&str> {
		self.get("scope").and_then(Value::as_str)
	}

	/// `expires_in` member as a duration, when present as a non-negative integer.
	pub fn expires_in(&self) -> Option<Duration> {
		let secs = self.get("expires_in").and_then(Value::as_u64)?;

		i64::try_from(secs).ok().map(Duration::seconds)
	}

	/// Reassembles the full JSON body as the server sent it.
	pub fn into_json(self) -> Value {
		let mut body = self.extra;

		body.insert("access_token".into(), Value::String(self.access_token.into_inner()));

		Value::Object(body)
	}
}

/// Structured OAuth error payload (`error` + `error_description`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Machine code such as `invalid_grant` or `unauthorized_client`.
	pub error: String,
	/// Human-readable explanation supplied by the server.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_description: Option<String>,
	/// Remaining members as sent.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl Display for ErrorResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match &self.error_description {
			Some(description) => write!(f, "{} ({description})", self.error),
			None => f.write_str(&self.error),
		}
	}
}

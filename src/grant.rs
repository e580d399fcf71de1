//! Grant configuration sent to the token endpoint.
//!
//! A [`GrantRequest`] is a `grant_type` plus whatever form fields that grant needs. Fields
//! are forwarded verbatim: nothing is renamed, filtered, or defaulted beyond the grant type
//! itself. A realm set through [`GrantRequest::realm`] only routes the request; a `realmName`
//! key loaded from a settings map routes it and is still posted with the other fields.

// self
use crate::_prelude::*;

/// Settings key that carries the realm name in a flat settings map.
pub const REALM_SETTING: &str = "realmName";

const GRANT_TYPE_FIELD: &str = "grant_type";
const REDACTED_FIELDS: [&str; 4] = ["password", "client_secret", "refresh_token", "code"];

/// OAuth 2.0 grant types understood by Keycloak's token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GrantType {
	/// Resource owner password credentials grant.
	Password,
	/// Client credentials grant for service accounts.
	ClientCredentials,
	/// Refresh token grant.
	RefreshToken,
	/// Authorization code grant.
	AuthorizationCode,
	/// Any other grant identifier (token exchange, device code, ...), sent as-is.
	Other(String),
}
impl GrantType {
	/// Returns the wire identifier for the grant type.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Password => "password",
			Self::ClientCredentials => "client_credentials",
			Self::RefreshToken => "refresh_token",
			Self::AuthorizationCode => "authorization_code",
			Self::Other(value) => value,
		}
	}

	/// Returns a bounded label suitable for span or metric fields.
	///
	/// Custom grants collapse into `other` so label cardinality stays fixed.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Password => "password",
			Self::ClientCredentials => "client_credentials",
			Self::RefreshToken => "refresh_token",
			Self::AuthorizationCode => "authorization_code",
			Self::Other(_) => "other",
		}
	}
}
impl From<&str> for GrantType {
	fn from(value: &str) -> Self {
		match value {
			"password" => Self::Password,
			"client_credentials" => Self::ClientCredentials,
			"refresh_token" => Self::RefreshToken,
			"authorization_code" => Self::AuthorizationCode,
			other => Self::Other(other.to_owned()),
		}
	}
}
impl From<String> for GrantType {
	fn from(value: String) -> Self {
		match Self::from(value.as_str()) {
			Self::Other(_) => Self::Other(value),
			known => known,
		}
	}
}
impl From<GrantType> for String {
	fn from(value: GrantType) -> Self {
		match value {
			GrantType::Other(value) => value,
			known => known.as_str().to_owned(),
		}
	}
}
impl FromStr for GrantType {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::from(s))
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Errors raised while reading a grant from a flat settings map.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum GrantSettingsError {
	/// Settings omit the mandatory `grant_type` key.
	#[error("Grant settings are missing `grant_type`.")]
	MissingGrantType,
}

/// Form fields for one token request plus the realm it targets.
///
/// Serializes to and from a flat string map such as
/// `{"grant_type":"password","username":"admin","password":"admin","client_id":"admin-cli","realmName":"demo"}`;
/// every key, [`REALM_SETTING`] included, is kept as a form field, and [`REALM_SETTING`] also
/// picks the realm when [`GrantRequest::realm`] was not called.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct GrantRequest {
	grant_type: GrantType,
	params: BTreeMap<String, String>,
	realm: Option<String>,
}
impl GrantRequest {
	/// Creates a request for `grant_type` with no other fields.
	pub fn new(grant_type: impl Into<GrantType>) -> Self {
		Self { grant_type: grant_type.into(), params: BTreeMap::new(), realm: None }
	}

	/// Resource owner password grant for `username` through the public client `client_id`.
	pub fn password(
		client_id: impl Into<String>,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		Self::new(GrantType::Password)
			.param("client_id", client_id)
			.param("username", username)
			.param("password", password)
	}

	/// Client credentials grant for a confidential client's service account.
	pub fn client_credentials(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self::new(GrantType::ClientCredentials)
			.param("client_id", client_id)
			.param("client_secret", client_secret)
	}

	/// Adds or replaces a form field. Setting `grant_type` replaces the grant type.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		let key = key.into();
		let value = value.into();

		if key == GRANT_TYPE_FIELD {
			self.grant_type = value.into();
		} else {
			self.params.insert(key, value);
		}

		self
	}

	/// Targets `realm` instead of the requester's default realm.
	pub fn realm(mut self, realm: impl Into<String>) -> Self {
		self.realm = Some(realm.into());

		self
	}

	/// Grant type sent as `grant_type`.
	pub fn grant_type(&self) -> &GrantType {
		&self.grant_type
	}

	/// Realm targeted by this request, falling back to a [`REALM_SETTING`] form field.
	pub fn realm_name(&self) -> Option<&str> {
		self.realm.as_deref().or_else(|| self.params.get(REALM_SETTING).map(String::as_str))
	}

	/// Looks up a form field, including `grant_type`.
	pub fn get(&self, key: &str) -> Option<&str> {
		if key == GRANT_TYPE_FIELD {
			Some(self.grant_type.as_str())
		} else {
			self.params.get(key).map(String::as_str)
		}
	}

	/// Iterates over every form field, `grant_type` first.
	pub fn form_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
		std::iter::once((GRANT_TYPE_FIELD, self.grant_type.as_str()))
			.chain(self.params.iter().map(|(key, value)| (key.as_str(), value.as_str())))
	}

	/// Encodes the form fields as an `application/x-www-form-urlencoded` body.
	pub fn to_form_body(&self) -> String {
		url::form_urlencoded::Serializer::new(String::new()).extend_pairs(self.form_pairs()).finish()
	}
}
impl Debug for GrantRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let params = self
			.params
			.iter()
			.map(|(key, value)| {
				let shown =
					if REDACTED_FIELDS.contains(&key.as_str()) { "<redacted>" } else { value.as_str() };

				(key.as_str(), shown)
			})
			.collect::<BTreeMap<_, _>>();

		f.debug_struct("GrantRequest")
			.field("grant_type", &self.grant_type)
			.field("params", &params)
			.field("realm", &self.realm)
			.finish()
	}
}
impl TryFrom<BTreeMap<String, String>> for GrantRequest {
	type Error = GrantSettingsError;

	fn try_from(mut settings: BTreeMap<String, String>) -> Result<Self, Self::Error> {
		let grant_type =
			settings.remove(GRANT_TYPE_FIELD).ok_or(GrantSettingsError::MissingGrantType)?;

		Ok(Self { grant_type: grant_type.into(), params: settings, realm: None })
	}
}
impl From<GrantRequest> for BTreeMap<String, String> {
	fn from(value: GrantRequest) -> Self {
		let mut settings = value.params;

		settings.insert(GRANT_TYPE_FIELD.into(), value.grant_type.into());

		if let Some(realm) = value.realm {
			settings.entry(REALM_SETTING.into()).or_insert(realm);
		}

		settings
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn grant_type_round_trips_known_and_custom_identifiers() {
		assert_eq!(GrantType::from("password"), GrantType::Password);
		assert_eq!(GrantType::from("client_credentials"), GrantType::ClientCredentials);

		let exchange = GrantType::from("urn:ietf:params:oauth:grant-type:token-exchange");

		assert_eq!(exchange.as_str(), "urn:ietf:params:oauth:grant-type:token-exchange");
		assert_eq!(exchange.label(), "other");
	}

	#[test]
	fn form_body_carries_every_field() {
		let grant = GrantRequest::password("admin-cli", "admin", "p@ss word").realm("demo");

		assert_eq!(
			grant.to_form_body(),
			"grant_type=password&client_id=admin-cli&password=p%40ss+word&username=admin"
		);
		assert_eq!(grant.realm_name(), Some("demo"));
	}

	#[test]
	fn grant_type_param_replaces_grant() {
		let grant = GrantRequest::new(GrantType::Password).param("grant_type", "refresh_token");

		assert_eq!(grant.grant_type(), &GrantType::RefreshToken);
		assert_eq!(grant.get("grant_type"), Some("refresh_token"));
		assert_eq!(grant.form_pairs().count(), 1);
	}

	#[test]
	fn settings_map_routes_and_posts_realm_name() {
		let settings: BTreeMap<String, String> = [
			("grant_type", "client_credentials"),
			("client_id", "service_accountid"),
			("client_secret", "28912097-138a-45e9-b2c2-d1faf4c0a86a"),
			("realmName", "demo"),
		]
		.into_iter()
		.map(|(key, value)| (key.to_owned(), value.to_owned()))
		.collect();
		let grant = GrantRequest::try_from(settings.clone())
			.expect("Settings with a grant type should convert.");

		assert_eq!(grant.grant_type(), &GrantType::ClientCredentials);
		assert_eq!(grant.realm_name(), Some("demo"));
		assert_eq!(grant.get("realmName"), Some("demo"));
		assert_eq!(
			grant.to_form_body(),
			"grant_type=client_credentials&client_id=service_accountid&client_secret=28912097-138a-45e9-b2c2-d1faf4c0a86a&realmName=demo"
		);
		assert_eq!(BTreeMap::from(grant), settings);
	}

	#[test]
	fn builder_realm_takes_precedence_over_realm_field() {
		let grant = GrantRequest::password("admin-cli", "admin", "admin")
			.param(REALM_SETTING, "demo")
			.realm("edge");

		assert_eq!(grant.realm_name(), Some("edge"));
		assert_eq!(grant.get(REALM_SETTING), Some("demo"));
		assert_eq!(BTreeMap::from(grant).get(REALM_SETTING).map(String::as_str), Some("demo"));
	}

	#[test]
	fn settings_map_requires_grant_type() {
		let settings = BTreeMap::from([("username".to_owned(), "admin".to_owned())]);

		assert_eq!(GrantRequest::try_from(settings), Err(GrantSettingsError::MissingGrantType));
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let grant = GrantRequest::client_credentials("svc", "top-secret");
		let rendered = format!("{grant:?}");

		assert!(rendered.contains("svc"));
		assert!(!rendered.contains("top-secret"));
	}
}

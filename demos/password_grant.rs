//! Demonstrates requesting tokens with the password and client-credentials grants, and
//! branching on the error variants, against an `httpmock` stand-in for a Keycloak server.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use keycloak_token_request::{Error, GrantRequest, ReqwestTokenRequester};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let password_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/realms/master/protocol/openid-connect/token")
				.body("grant_type=password&client_id=admin-cli&password=admin&username=admin");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":60}",
			);
		})
		.await;
	let service_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/realms/demo/protocol/openid-connect/token");
			then.status(401).header("content-type", "application/json").body(
				"{\"error\":\"unauthorized_client\",\"error_description\":\"Invalid client secret\"}",
			);
		})
		.await;
	let requester = ReqwestTokenRequester::new();
	let base_url = server.url("/auth");
	let token = requester
		.request_token(&base_url, &GrantRequest::password("admin-cli", "admin", "admin"))
		.await?;

	println!(
		"Received a {} token valid for {:?}.",
		token.token_type().unwrap_or("unknown"),
		token.expires_in()
	);

	let service_grant =
		GrantRequest::client_credentials("service_accountid", "not-the-secret").realm("demo");

	match requester.request_token(&base_url, &service_grant).await {
		Ok(_) => println!("Service account unexpectedly authenticated."),
		Err(Error::Protocol { status, response }) =>
			println!("Keycloak rejected the service account with HTTP {status}: {response}."),
		Err(err) => return Err(err.into()),
	}

	password_mock.assert_async().await;
	service_mock.assert_async().await;

	Ok(())
}

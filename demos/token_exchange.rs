//! Exchanges client credentials against a local mock identity endpoint and uses the resulting
//! bearer token for one authorized API call.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use investec_agent::{
	agent::AuthorizedClient,
	auth::Credentials,
	exchange::CredentialExchanger,
	http::ReqwestHttpClient,
	provider::ProviderDescriptor,
	reqwest::{Client, Method},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/identity/v2/oauth2/token")
				.header("x-api-key", "demo-api-key")
				.body("grant_type=client_credentials");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":1799}",
			);
		})
		.await;
	let accounts_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/za/pb/v1/accounts").header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"accounts\":[{\"accountId\":\"1\",\"accountName\":\"Demo\"}]}}");
		})
		.await;
	let descriptor = ProviderDescriptor::builder()
		.investec_defaults()
		.token_endpoint(Url::parse(&server.url("/identity/v2/oauth2/token"))?)
		.api_base(Url::parse(&server.base_url())?)
		.build()?;
	let http_client = Arc::new(ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	));
	let exchanger = <CredentialExchanger>::with_http_client(descriptor, http_client.clone());
	let credentials = Credentials::new("demo-client", "demo-secret", "demo-api-key");
	let token = exchanger.authenticate(&credentials).await?;

	println!("Token: {token:?}");
	println!("Expires at: {:?}", token.expires_at());

	let client =
		AuthorizedClient::new(&token, exchanger.descriptor.api_base.clone(), http_client);
	let response = client.send(Method::GET, "/za/pb/v1/accounts", None).await?;

	println!("Accounts (HTTP {}): {}", response.status, response.body);

	token_mock.assert_async().await;
	accounts_mock.assert_async().await;

	Ok(())
}

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use investec_agent::{
	agent::{ApiResponse, AuthorizedClient},
	auth::AccessToken,
	error::AgentError,
	http::ReqwestHttpClient,
	reqwest::{Client, Method},
	url::Url,
};

fn client(server: &MockServer) -> AuthorizedClient {
	let http = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	AuthorizedClient::new(
		&AccessToken::new("T"),
		Url::parse(&server.url("/za/pb/v1")).expect("Mock API base should parse successfully."),
		Arc::new(ReqwestHttpClient::with_client(http)),
	)
}

#[tokio::test]
async fn every_call_carries_the_bearer_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/za/pb/v1/accounts").header("authorization", "Bearer T");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"accounts\":[]}}");
		})
		.await;
	let client = client(&server);

	for _ in 0..2 {
		let response =
			client.send(Method::GET, "/accounts", None).await.expect("Mock call should succeed.");

		assert_eq!(
			response,
			ApiResponse { status: 200, body: "{\"data\":{\"accounts\":[]}}".into() }
		);
	}

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn error_statuses_are_returned_not_raised() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/za/pb/v1/accounts/missing/balance");
			then.status(404).body("not found");
		})
		.await;
	let response = client(&server)
		.send(Method::GET, "accounts/missing/balance", None)
		.await
		.expect("A 404 is still a response.");

	mock.assert_async().await;

	assert_eq!(response.status, 404);
	assert_eq!(response.body, "not found");
}

#[tokio::test]
async fn redirects_are_not_followed() {
	let server = MockServer::start_async().await;
	let redirect = server
		.mock_async(|when, then| {
			when.method(GET).path("/za/pb/v1/accounts");
			then.status(302).header("location", "https://attacker.example.com/collect");
		})
		.await;
	// The strict default client rejects the mock's self-signed certificate; loopback HTTP is allowed.
	let http = ReqwestHttpClient::new().expect("Default client should build.");
	let client = AuthorizedClient::new(
		&AccessToken::new("T"),
		Url::parse(&format!("http://{}/za/pb/v1", server.address()))
			.expect("Mock API base should parse successfully."),
		Arc::new(http),
	);
	let response =
		client.send(Method::GET, "/accounts", None).await.expect("A 302 is still a response.");

	redirect.assert_async().await;

	assert_eq!(response.status, 302);
}

#[tokio::test]
async fn foreign_origins_are_refused_locally() {
	let server = MockServer::start_async().await;
	let err = client(&server)
		.send(Method::GET, "https://attacker.example.com/collect", None)
		.await
		.expect_err("Foreign origins should be refused.");

	assert!(matches!(err, AgentError::ForeignOrigin { .. }));
}

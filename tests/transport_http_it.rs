#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use refresh_coordinator::{
	_preludet::*,
	coordinator::RefreshCoordinator,
	jwt::DecodedPayload,
	session::{MemorySession, SessionBridge, TokenPair},
	transport::{HttpRefreshTransport, RefreshTransport, TransportError},
};

fn transport_for(server: &MockServer) -> HttpRefreshTransport {
	HttpRefreshTransport::new(
		Url::parse(&server.url("/auth/refresh")).expect("Mock refresh endpoint should parse."),
	)
}

#[tokio::test]
async fn refresh_posts_token_and_parses_pair() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/refresh")
				.header("content-type", "application/json")
				.json_body(json!({ "refresh_token": "refresh-old" }));
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-new\",\"refresh_token\":\"refresh-new\",\"token_type\":\"bearer\",\"expires_in\":1800}",
				);
		})
		.await;
	let pair = transport_for(&server)
		.refresh("refresh-old")
		.await
		.expect("Refresh call should succeed against the mock endpoint.");

	mock.assert_async().await;

	assert_eq!(pair.access_token.expose(), "access-new");
	assert_eq!(pair.refresh_token.expose(), "refresh-new");
	assert_eq!(pair.token_type, "bearer");
	assert_eq!(pair.expires_in, 1_800);
}

#[tokio::test]
async fn non_success_status_maps_to_endpoint_error() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
	let err = transport_for(&server)
		.refresh("refresh-expired")
		.await
		.expect_err("A 401 response should surface as an endpoint error.");

	mock.assert_async().await;

	assert_eq!(
		err,
		TransportError::Endpoint { status: 401, message: "{\"error\":\"invalid_grant\"}".into() },
	);
}

#[tokio::test]
async fn malformed_body_maps_to_parse_error() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":42}");
		})
		.await;
	let err = transport_for(&server)
		.refresh("refresh-old")
		.await
		.expect_err("A malformed body should surface as a parse error.");

	mock.assert_async().await;

	assert!(matches!(err, TransportError::ResponseParse { .. }));
}

#[tokio::test]
async fn coordinator_refreshes_through_http_transport() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/refresh")
				.json_body(json!({ "refresh_token": "refresh-old" }));
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-new\",\"refresh_token\":\"refresh-new\",\"token_type\":\"bearer\",\"expires_in\":1800}",
				);
		})
		.await;
	let session = Arc::new(MemorySession::default());
	let expired = encode_unsigned_jwt(&DecodedPayload {
		subject: "user-1".into(),
		email: String::new(),
		expires_at: OffsetDateTime::now_utc().unix_timestamp() - 10,
		issuer: String::new(),
	});

	session.sign_in(TokenPair::new(expired.as_str(), "refresh-old", "bearer", 0));

	let coordinator =
		RefreshCoordinator::new(session.clone(), Arc::new(transport_for(&server)));
	let access = coordinator
		.valid_access_token()
		.await
		.expect("An expired stored token should be replaced via the HTTP transport.");

	mock.assert_async().await;

	assert_eq!(access, "access-new");
	assert_eq!(
		session.tokens().expect("Session should hold the rotated pair.").refresh_token.expose(),
		"refresh-new",
	);
}

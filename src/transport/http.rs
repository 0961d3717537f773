//! Reqwest-backed [`RefreshTransport`] speaking the JSON refresh endpoint convention.

// self
use crate::{
	_prelude::*,
	session::TokenPair,
	transport::{RefreshTransport, TransportError, TransportFuture},
};

#[derive(Serialize)]
struct RefreshRequest<'a> {
	refresh_token: &'a str,
}

/// HTTP transport that POSTs the refresh token as JSON and parses the returned pair.
///
/// The endpoint is expected to answer 2xx with an `access_token`/`refresh_token`/`token_type`/
/// `expires_in` body; anything else maps onto the [`TransportError`] taxonomy and ends the
/// session upstream.
#[derive(Clone, Debug)]
pub struct HttpRefreshTransport {
	client: ReqwestClient,
	endpoint: Url,
}
impl HttpRefreshTransport {
	/// Creates a transport backed by a default reqwest client.
	pub fn new(endpoint: Url) -> Self {
		Self::with_client(ReqwestClient::default(), endpoint)
	}

	/// Wraps an existing reqwest client; configure timeouts, proxies, and internal retries
	/// there.
	pub fn with_client(client: ReqwestClient, endpoint: Url) -> Self {
		Self { client, endpoint }
	}
}
impl RefreshTransport for HttpRefreshTransport {
	fn refresh<'a>(&'a self, refresh_token: &'a str) -> TransportFuture<'a, TokenPair> {
		Box::pin(async move {
			let response = self
				.client
				.post(self.endpoint.clone())
				.json(&RefreshRequest { refresh_token })
				.send()
				.await
				.map_err(|e| TransportError::Network { message: e.to_string() })?;
			let status = response.status();
			let body = response
				.bytes()
				.await
				.map_err(|e| TransportError::Network { message: e.to_string() })?;

			if !status.is_success() {
				return Err(TransportError::Endpoint {
					status: status.as_u16(),
					message: String::from_utf8_lossy(&body).trim().to_string(),
				});
			}

			let mut deserializer = serde_json::Deserializer::from_slice(&body);

			serde_path_to_error::deserialize(&mut deserializer)
				.map_err(|e| TransportError::ResponseParse { message: e.to_string() })
		})
	}
}

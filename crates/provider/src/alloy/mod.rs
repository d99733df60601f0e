// This file is part of Userop.
//
// Userop is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Userop is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Userop.
// If not, see https://www.gnu.org/licenses/.

use alloy_provider::ProviderBuilder;
use alloy_rpc_client::RpcClient;
use alloy_transport_http::Http;
use anyhow::Context;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
};
use url::Url;

use crate::SmartAccountClient;

mod client;
pub use client::AlloyNodeClient;

/// Connection settings for an RPC endpoint: either a full URL, or an
/// api-key appended to a vendor base URL, optionally with a bearer token.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Endpoint URL.
    pub url: String,
    /// Bearer token attached to every request.
    pub jwt: Option<String>,
}

impl Connection {
    /// Connection to a plain URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            jwt: None,
        }
    }

    /// Connection to `base_url` with the api key as the final path segment,
    /// the scheme vendor endpoints use.
    pub fn with_api_key(base_url: &str, api_key: &str) -> Self {
        Self {
            url: format!("{}/{}", base_url.trim_end_matches('/'), api_key),
            jwt: None,
        }
    }

    /// Attaches a bearer token.
    pub fn with_jwt(mut self, jwt: impl Into<String>) -> Self {
        self.jwt = Some(jwt.into());
        self
    }
}

/// Create a new alloy-backed client from connection settings.
pub fn new_alloy_client(
    connection: &Connection,
) -> anyhow::Result<impl SmartAccountClient + Clone + 'static> {
    let url = Url::parse(&connection.url).context("invalid rpc url")?;

    let mut headers = HeaderMap::new();
    if let Some(jwt) = &connection.jwt {
        let mut value = HeaderValue::from_str(&format!("Bearer {jwt}"))
            .context("invalid bearer token")?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    let http_client = Client::builder()
        .default_headers(headers)
        .build()
        .context("should build http client")?;

    let transport = Http::with_client(http_client, url);
    let client = RpcClient::new(transport, false);
    let provider = ProviderBuilder::new().on_client(client);
    Ok(AlloyNodeClient::new(provider))
}

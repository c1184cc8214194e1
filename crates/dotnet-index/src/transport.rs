//! Pluggable network transport, so the cache can be driven against a mock in
//! tests and so callers can supply a `customTransport` per spec.md §4.1's
//! configuration surface.

use async_trait::async_trait;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, reqwest::Error>;
}

/// Default transport: a `reqwest::Client`, optionally routed through a proxy
/// (spec.md §4.1's `proxyUrl` option), matching the teacher's single
/// lazily-built HTTP client convention (`vx-core::http::get_http_client`).
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(proxy_url: Option<&str>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent("dnvm/1.0")
            .timeout(std::time::Duration::from_secs(30));
        if let Some(proxy) = proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(Self { client: builder.build()? })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch_text(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}

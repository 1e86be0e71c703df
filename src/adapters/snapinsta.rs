//! SnapInsta Resolver Adapter
//!
//! Two sequential calls: a verification call that issues a short-lived
//! token for the requested URL, then the search call that returns the
//! markup payload. The payload is frequently wrapped in the packed-eval
//! obfuscation handled by [`crate::packed`].

use serde::Deserialize;
use tracing::debug;

use crate::adapters::ResolverGateway;
use crate::error::{Result, SnapferryError};
use crate::http::HttpClient;
use async_trait::async_trait;

pub const SNAPINSTA_BASE: &str = "https://snapinsta.to";
pub const VERIFY_PATH: &str = "/api/userverify";
pub const SEARCH_PATH: &str = "/api/ajaxSearch";

/// `{success: bool, token: string}` from /api/userverify
#[derive(Debug, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
}

/// `{status: "ok"|other, data: string}` from /api/ajaxSearch
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

pub struct SnapInstaClient {
    http: HttpClient,
    api_base: String,
}

impl SnapInstaClient {
    pub fn new(api_base: Option<&str>) -> Result<Self> {
        Self::new_with_timeout(api_base, 15)
    }

    /// `api_base` override exists for hermetic integration tests; the
    /// production host is [`SNAPINSTA_BASE`].
    pub fn new_with_timeout(api_base: Option<&str>, timeout_secs: u64) -> Result<Self> {
        let api_base = api_base.unwrap_or(SNAPINSTA_BASE).to_string();
        // Referer/Origin always advertise the production site, even
        // against an override base.
        let http = HttpClient::with_timeout(SNAPINSTA_BASE, timeout_secs)?;
        Ok(Self { http, api_base })
    }

    /// Verification call: the resolver checks the URL and issues a
    /// token consumed by the search call.
    pub async fn verify(&self, url: &str) -> Result<String> {
        let endpoint = format!("{}{}", self.api_base, VERIFY_PATH);
        let resp: VerifyResponse = self.http.post_form(&endpoint, &[("url", url)]).await?;

        if !resp.success {
            return Err(SnapferryError::VerificationRejected(url.to_string()));
        }
        resp.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SnapferryError::VerificationRejected(url.to_string()))
    }

    /// Search call: exchanges the token for the raw markup payload.
    pub async fn search(&self, url: &str, token: &str) -> Result<String> {
        let endpoint = format!("{}{}", self.api_base, SEARCH_PATH);
        let resp: SearchResponse = self
            .http
            .post_form(
                &endpoint,
                &[
                    ("q", url),
                    ("t", "media"),
                    ("v", "v2"),
                    ("lang", "en"),
                    ("cftoken", token),
                ],
            )
            .await?;

        if resp.status.as_deref() != Some("ok") {
            return Err(SnapferryError::PayloadMissing);
        }
        resp.data.ok_or(SnapferryError::PayloadMissing)
    }
}

#[async_trait]
impl ResolverGateway for SnapInstaClient {
    fn resolver_id(&self) -> &'static str {
        "snapinsta"
    }

    async fn fetch_payload(&self, url: &str) -> Result<String> {
        let token = self.verify(url).await?;
        debug!(token_len = token.len(), "resolver verification passed");
        self.search(url, &token).await
    }
}

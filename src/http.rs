use std::time::Duration;

use wreq::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER},
    Client,
};
use wreq_util::{Emulation, EmulationOS, EmulationOption};

use crate::error::{Result, SnapferryError};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Shared outbound client. Carries the browser-shaped default headers
/// the resolver expects and a pinned TLS fingerprint; constructed once
/// per request and passed down explicitly.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(site_base: &str) -> Result<Self> {
        Self::with_timeout(site_base, DEFAULT_TIMEOUT_SECS)
    }

    /// `site_base` feeds the Referer/Origin pair; the resolver rejects
    /// requests without them.
    pub fn with_timeout(site_base: &str, timeout_secs: u64) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(
            REFERER,
            HeaderValue::from_str(&format!("{}/", site_base.trim_end_matches('/')))
                .map_err(|_| SnapferryError::InvalidUrl(format!("bad site base: {}", site_base)))?,
        );
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(site_base.trim_end_matches('/'))
                .map_err(|_| SnapferryError::InvalidUrl(format!("bad site base: {}", site_base)))?,
        );
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let emulation = EmulationOption::builder()
            .emulation(Emulation::Chrome143)
            .emulation_os(EmulationOS::Windows)
            .build();

        let client = Client::builder()
            .emulation(emulation)
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SnapferryError::GatewayUnavailable(e.to_string()))?;

        Ok(Self { client })
    }

    /// POST a form body and parse the JSON response.
    pub async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(SnapferryError::from)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SnapferryError::GatewayUnavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(status_to_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| SnapferryError::InvalidJson(e.to_string()))
    }
}

fn status_to_error(status: wreq::StatusCode, body: &str) -> SnapferryError {
    let detail = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("resolver returned an error status")
    } else {
        body
    };
    SnapferryError::GatewayUnavailable(format!("HTTP {}: {}", status.as_u16(), detail))
}

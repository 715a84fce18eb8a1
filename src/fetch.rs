// src/fetch.rs
use std::time::Duration;

use crate::error::PipelineError;

/// Browser-like identity; several feed origins reject the default
/// reqwest user agent outright.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Raw payload from one endpoint plus the charset the transport reported,
/// when it reported one at all.
#[derive(Debug)]
pub struct FetchedPayload {
    pub bytes: Vec<u8>,
    pub charset_hint: Option<String>,
}

/// Shared HTTP client for all source endpoints. Built once at startup.
pub struct Fetcher {
    http: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { http }
    }

    /// GET one endpoint. Non-2xx, timeouts and connect failures all come
    /// back as `Transport`; callers abandon the source and move on.
    pub async fn fetch_bytes(
        &self,
        origin: &str,
        url: &str,
    ) -> Result<FetchedPayload, PipelineError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Transport {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PipelineError::Transport {
                origin: origin.to_string(),
                message: format!("status {status}"),
            });
        }

        let charset_hint = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PipelineError::Transport {
                origin: origin.to_string(),
                message: e.to_string(),
            })?
            .to_vec();

        Ok(FetchedPayload {
            bytes,
            charset_hint,
        })
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the `charset=` parameter out of a Content-Type header value.
fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|part| {
        let part = part.trim();
        part.strip_prefix("charset=")
            .map(|c| c.trim_matches('"').to_ascii_lowercase())
    })
}

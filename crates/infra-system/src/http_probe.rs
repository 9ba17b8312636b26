// HTTP health probe: one HEAD request, redirects inspected rather than followed
use async_trait::async_trait;
use reqwest::{redirect, Client, Url};
use std::time::{Duration, Instant};
use tracing::debug;

use blackoutbox_core::domain::ProbeResponse;
use blackoutbox_core::error::{AppError, Result};
use blackoutbox_core::port::HealthProbe;

pub struct HttpHealthProbe {
    client: Client,
    timeout: Duration,
}

impl HttpHealthProbe {
    /// Build a probe whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("blackoutbox/", env!("CARGO_PKG_VERSION")))
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Probe(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self, url: &str) -> Result<ProbeResponse> {
        let url = Url::parse(url)
            .map_err(|e| AppError::Probe(format!("failed to create request for {url}: {e}")))?;

        let started = Instant::now();
        let response = self.client.head(url.clone()).send().await;
        let elapsed = started.elapsed();

        match response {
            Ok(response) => {
                let code = response.status().as_u16();
                debug!(url = %url, status = code, elapsed_ms = elapsed.as_millis() as u64, "Probe answered");
                Ok(ProbeResponse::Status { code, elapsed })
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    format!("timed out after {:?}", self.timeout)
                } else {
                    e.to_string()
                };
                debug!(url = %url, reason = %reason, "Probe transport failure");
                Ok(ProbeResponse::Transport(reason))
            }
        }
    }
}

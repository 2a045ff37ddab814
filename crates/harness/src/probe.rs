//! HTTP probing - a single GET per target plus the pre-flight health check

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::registry::TargetDescriptor;

/// Raw result of fetching one address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Absent when the request never produced a response
    pub http_status: Option<u16>,
    pub elapsed_millis: u64,
    pub byte_size: u64,
    #[serde(skip)]
    pub body: String,
    pub network_error: Option<String>,
}

impl ProbeOutcome {
    pub fn response(status: u16, body: impl Into<String>, elapsed_millis: u64) -> Self {
        let body = body.into();
        Self {
            http_status: Some(status),
            elapsed_millis,
            byte_size: body.len() as u64,
            body,
            network_error: None,
        }
    }

    pub fn network_failure(error: impl Into<String>, elapsed_millis: u64) -> Self {
        Self {
            http_status: None,
            elapsed_millis,
            byte_size: 0,
            body: String::new(),
            network_error: Some(error.into()),
        }
    }
}

/// Something that can GET a URL.
///
/// Implementations must fold every transport failure into
/// [`ProbeOutcome::network_error`]; callers never handle transport errors.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn fetch(&self, url: &str) -> ProbeOutcome;
}

/// Join a base URL and a target address without doubling the slash
pub fn target_url(base_url: &str, address: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if address.starts_with('/') {
        format!("{}{}", base, address)
    } else {
        format!("{}/{}", base, address)
    }
}

/// Probe one registry target
pub async fn probe_target<P: Probe + ?Sized>(
    probe: &P,
    base_url: &str,
    target: &TargetDescriptor,
) -> (String, ProbeOutcome) {
    let url = target_url(base_url, &target.address);
    debug!("GET {}", url);
    let outcome = probe.fetch(&url).await;
    (url, outcome)
}

/// Pre-flight check: the root address must answer 200
pub async fn health_check<P: Probe + ?Sized>(probe: &P, base_url: &str) -> HarnessResult<()> {
    info!("Checking server health at {}", base_url);
    let outcome = probe.fetch(base_url).await;

    let reason = match (outcome.http_status, outcome.network_error) {
        (Some(200), _) => {
            info!("Server is healthy at {}", base_url);
            return Ok(());
        }
        (_, Some(err)) => format!("cannot reach server: {}", err),
        (Some(status), None) => format!("returned HTTP {}", status),
        (None, None) => "no response".to_string(),
    };

    warn!("Health check failed: {}", reason);
    Err(HarnessError::Unhealthy {
        url: base_url.to_string(),
        reason,
    })
}

/// In-process HTTP probe backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> HarnessResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("docprobe/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn fetch(&self, url: &str) -> ProbeOutcome {
        let start = Instant::now();

        let response = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                return ProbeOutcome::network_failure(e.to_string(), start.elapsed().as_millis() as u64);
            }
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(bytes) => {
                let elapsed_millis = start.elapsed().as_millis() as u64;
                ProbeOutcome {
                    http_status: Some(status),
                    elapsed_millis,
                    byte_size: bytes.len() as u64,
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                    network_error: None,
                }
            }
            Err(e) => ProbeOutcome::network_failure(
                format!("failed to read body: {}", e),
                start.elapsed().as_millis() as u64,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_joins_cleanly() {
        assert_eq!(
            target_url("http://localhost:6006", "/?path=/docs/intro--docs"),
            "http://localhost:6006/?path=/docs/intro--docs"
        );
        assert_eq!(target_url("http://localhost:6006/", "/a"), "http://localhost:6006/a");
        assert_eq!(target_url("http://localhost:6006", "a"), "http://localhost:6006/a");
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = ProbeOutcome::response(200, "hello", 12);
        assert_eq!(ok.http_status, Some(200));
        assert_eq!(ok.byte_size, 5);
        assert!(ok.network_error.is_none());

        let failed = ProbeOutcome::network_failure("connection refused", 3);
        assert_eq!(failed.http_status, None);
        assert_eq!(failed.network_error.as_deref(), Some("connection refused"));
    }
}

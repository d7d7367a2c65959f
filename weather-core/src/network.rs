use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// On-demand connectivity check. There is no change notification; callers ask
/// again whenever they need a fresh answer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetworkMonitor: Send + Sync {
    async fn has_network_access(&self) -> bool;
}

/// Considers the network up when a TCP connection to `host:port` succeeds.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Probe the host a service URL points at, on its explicit or default port.
    pub fn for_url(url: &str) -> anyhow::Result<Self> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| anyhow::anyhow!("Invalid service URL '{url}': {e}"))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("Service URL '{url}' has no host"))?;
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| anyhow::anyhow!("Service URL '{url}' has no known port"))?;

        Ok(Self::new(host, port))
    }
}

#[async_trait]
impl NetworkMonitor for TcpProbe {
    async fn has_network_access(&self) -> bool {
        let addr = (self.host.as_str(), self.port);

        match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(host = %self.host, port = self.port, error = %e, "Connectivity probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(host = %self.host, port = self.port, "Connectivity probe timed out");
                false
            }
        }
    }
}

//! Listener settings for `librarian serve`

use std::io;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

const DEFAULT_PORT: u16 = 7474;

/// Where the HTTP transport listens; loopback unless configured otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl HttpServerConfig {
    /// Apply `--host` / `--port` flags on top of the file values
    pub fn override_with(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
    }

    /// Address to bind; `host` must be an IP literal
    pub fn listen_addr(&self) -> io::Result<SocketAddr> {
        let ip: IpAddr = self.host.parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid listen host {:?}: {}", self.host, e),
            )
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

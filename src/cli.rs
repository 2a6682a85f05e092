//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{load_config, ConfigError, ProxyConfig};

#[derive(Debug, Parser)]
#[command(name = "origin-proxy")]
#[command(about = "Single-origin reverse proxy with cookie domain rewriting", long_about = None)]
pub struct Cli {
    /// Port to listen on (443 enables TLS and an HTTP redirect listener)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Upstream origin URL, e.g. https://postman-echo.com/
    #[arg(long)]
    pub origin: Option<String>,

    /// Local path prefix forwarded to the origin
    #[arg(long)]
    pub prefix: Option<String>,

    /// Log level or tracing filter directive
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Load the configuration file (or defaults) and apply flag overrides.
    pub fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(self, config: &mut ProxyConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(origin) = self.origin {
            config.upstream.origin = origin;
        }
        if let Some(prefix) = self.prefix {
            config.upstream.local_prefix = prefix;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

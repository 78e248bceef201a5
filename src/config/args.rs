//! Command-line arguments.
//!
//! Every flag also reads an environment variable, so the filter can be
//! configured entirely from a container spec.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::{FilterConfig, LogFormat};

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "webhook-filter", version)]
#[command(about = "Forwards git push webhooks to targets chosen by ref", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Web server port
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Mapping rules in JSON format; rules are a list of objects with a ref key
    /// and a target key; if target contains {{ }} it is treated as a template
    #[arg(long, env = "RULESJSON")]
    pub rulesjson: Option<String>,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "METRICS_ADDRESS")]
    pub metrics_address: Option<String>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Args {
    /// Overlay the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut FilterConfig) {
        if let Some(port) = self.port {
            config.listener.bind_address = match config.listener.bind_address.parse::<SocketAddr>() {
                Ok(mut addr) => {
                    addr.set_port(port);
                    addr.to_string()
                }
                Err(_) => format!("0.0.0.0:{}", port),
            };
        }

        if let Some(rules) = self.rulesjson.as_ref().filter(|r| !r.trim().is_empty()) {
            config.rules_json = Some(rules.clone());
        }

        if let Some(addr) = &self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = addr.clone();
        }

        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}

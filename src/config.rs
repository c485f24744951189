use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_ACCEPTED_EXTENSIONS: &str = "csv,xlsx,json";

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub max_file_size: usize,
    /// Lowercase extensions without the leading dot.
    pub accepted_extensions: Vec<String>,
    pub remote_endpoint: Option<String>,
    pub remote_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_file_size: default_max_file_size(),
            accepted_extensions: parse_extensions(DEFAULT_ACCEPTED_EXTENSIONS),
            remote_endpoint: None,
            remote_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("EDA_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("EDA_BIND_ADDR must be a socket address such as 127.0.0.1:3000")?;

        let max_file_size = match lookup("EDA_MAX_FILE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .context("EDA_MAX_FILE_SIZE must be a size in bytes")?,
            None => default_max_file_size(),
        };

        let accepted_extensions = parse_extensions(
            &lookup("EDA_ACCEPTED_EXTENSIONS")
                .unwrap_or_else(|| DEFAULT_ACCEPTED_EXTENSIONS.to_string()),
        );
        if accepted_extensions.is_empty() {
            anyhow::bail!("EDA_ACCEPTED_EXTENSIONS must list at least one extension");
        }

        let remote_endpoint = lookup("EDA_REMOTE_ENDPOINT")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let remote_timeout = match lookup("EDA_REMOTE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .context("EDA_REMOTE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => Duration::from_secs(30),
        };

        Ok(Config {
            bind_addr,
            max_file_size,
            accepted_extensions,
            remote_endpoint,
            remote_timeout,
        })
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

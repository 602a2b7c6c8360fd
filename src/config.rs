use std::env;
use std::net::SocketAddr;

use anyhow::{bail, Context, Result};

/// Base URL of the chat backend when BACKEND_URL is not set.
const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
/// Listen address when BIND_ADDR is not set.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Settings resolved once at startup, before the server binds.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the remote chat backend, without a trailing slash.
    pub backend_url: String,
    /// Address this application listens on.
    pub bind_addr: String,
}

impl AppConfig {
    /// Reads configuration from the environment (after dotenv has run).
    pub fn from_env() -> Result<Self> {
        let backend_url = env::var("BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let backend_url = normalize_backend_url(&backend_url)
            .with_context(|| format!("invalid BACKEND_URL: {:?}", backend_url))?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid BIND_ADDR: {:?}", bind_addr))?;

        Ok(Self {
            backend_url,
            bind_addr,
        })
    }
}

/// Strips trailing slashes so endpoint paths can be appended verbatim.
fn normalize_backend_url(raw: &str) -> Result<String> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        bail!("URL is empty");
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        bail!("URL must start with http:// or https://");
    }
    Ok(url.to_string())
}

//! Console configuration
//!
//! Defaults, then the JSON file given with `--config`, then environment
//! variables and flags (clap resolves those two, flags first).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use catalog_client::ClientConfig;
use catalog_client::config::DEFAULT_SEARCH_DELAY;
use serde::Deserialize;

use crate::cli::ConfigArgs;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub search_delay_ms: u64,
    pub session_cookie: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            api_url: client.base_url,
            timeout_secs: client.timeout,
            search_delay_ms: DEFAULT_SEARCH_DELAY.as_millis() as u64,
            session_cookie: None,
            log_dir: None,
        }
    }
}

impl ConsoleConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Layer command line and environment settings over the file (if any)
    pub fn resolve(args: &ConfigArgs) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = &args.api_url {
            config.api_url = url.clone();
        }
        if let Some(secs) = args.timeout_secs {
            config.timeout_secs = secs;
        }
        if let Some(ms) = args.search_delay_ms {
            config.search_delay_ms = ms;
        }
        if let Some(cookie) = &args.session_cookie {
            config.session_cookie = Some(cookie.clone());
        }
        if let Some(dir) = &args.log_dir {
            config.log_dir = Some(dir.clone());
        }

        if config.api_url.trim().is_empty() {
            anyhow::bail!("api_url must not be empty");
        }
        Ok(config)
    }

    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.api_url)
            .with_timeout(self.timeout_secs)
            .with_search_delay(self.search_delay());
        match &self.session_cookie {
            Some(cookie) => config.with_session_cookie(cookie),
            None => config,
        }
    }
}

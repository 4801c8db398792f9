//! Client endpoint configuration
//!
//! The bulk endpoint and the push channel can be configured independently.
//! When only one is given the other is derived from it: same host and
//! port, `http` <-> `ws`, `https` <-> `wss`, path `/ws` for the push
//! channel and `/` for the bulk base.

use std::time::Duration;

use reqwest::Url;

use crate::backoff::BackoffConfig;
use crate::error::ClientError;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const PUSH_PATH: &str = "/ws";

/// Where and how the client connects
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub ws_url: Url,
    pub backoff: BackoffConfig,
}

impl ClientConfig {
    /// Load from `POLL_API_URL`, `POLL_WS_URL`, `POLL_BACKOFF_INITIAL_MS`
    /// and `POLL_BACKOFF_MAX_MS` (and `.env`)
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let api = lookup("POLL_API_URL").filter(|v| !v.trim().is_empty());
        let ws = lookup("POLL_WS_URL").filter(|v| !v.trim().is_empty());

        let mut config = match (api, ws) {
            (Some(api), Some(ws)) => Self::new(parse_url(&api)?, parse_url(&ws)?),
            (Some(api), None) => Self::from_api_url(&api)?,
            (None, Some(ws)) => Self::from_ws_url(&ws)?,
            (None, None) => Self::from_api_url(DEFAULT_API_URL)?,
        };

        let defaults = BackoffConfig::default();
        let initial = parse_millis(&lookup, "POLL_BACKOFF_INITIAL_MS")?
            .unwrap_or(defaults.initial_delay);
        let max = parse_millis(&lookup, "POLL_BACKOFF_MAX_MS")?.unwrap_or(defaults.max_delay);
        config.backoff = BackoffConfig::new(initial, max.max(initial));

        Ok(config)
    }

    pub fn new(api_url: Url, ws_url: Url) -> Self {
        Self {
            api_url,
            ws_url,
            backoff: BackoffConfig::default(),
        }
    }

    /// Configure from the bulk endpoint base, deriving the push channel
    pub fn from_api_url(api_url: &str) -> Result<Self, ClientError> {
        let api = parse_url(api_url)?;
        let ws = derive_ws_url(&api)?;
        Ok(Self::new(api, ws))
    }

    /// Configure from the push channel, deriving the bulk endpoint base
    pub fn from_ws_url(ws_url: &str) -> Result<Self, ClientError> {
        let ws = parse_url(ws_url)?;
        let api = derive_api_url(&ws)?;
        Ok(Self::new(api, ws))
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Bulk read endpoint returning the ordered poll collection
    pub fn polls_url(&self) -> Result<Url, ClientError> {
        let base = self.api_url.as_str().trim_end_matches('/');
        parse_url(&format!("{base}/polls"))
    }
}

fn parse_url(raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw.trim()).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<Duration>, ClientError> {
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ClientError::InvalidConfig(name, raw))
        })
        .transpose()
}

fn with_scheme(source: &Url, scheme: &str, path: &str) -> Result<Url, ClientError> {
    let mut url = source.clone();
    url.set_scheme(scheme)
        .map_err(|()| ClientError::InvalidUrl(format!("cannot map {source} to {scheme}")))?;
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn derive_ws_url(api: &Url) -> Result<Url, ClientError> {
    let scheme = match api.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(ClientError::InvalidUrl(format!("unsupported scheme {other}"))),
    };
    with_scheme(api, scheme, PUSH_PATH)
}

fn derive_api_url(ws: &Url) -> Result<Url, ClientError> {
    let scheme = match ws.scheme() {
        "ws" => "http",
        "wss" => "https",
        other => return Err(ClientError::InvalidUrl(format!("unsupported scheme {other}"))),
    };
    with_scheme(ws, scheme, "/")
}

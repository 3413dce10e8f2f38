//! HTTP client for the logistics news feed.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::extract_headlines;

pub const DEFAULT_FEED_URL: &str = "https://gcaptain.com/feed/";
pub const DEFAULT_HEADLINE_LIMIT: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Some feeds refuse non-browser agents.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; delaycast/0.1)";

/// Simulated headlines used when the live feed cannot be read.
pub const FALLBACK_HEADLINES: &[&str] = &[
    "FMC Commissioners Confirm Administration Is Closing Longstanding Harbor Maintenance Tax Loophole",
    "New Trade Map Takes Shape in Davos as World Adjusts to Tariffs",
    "U.S. Coast Guard Seizes $7M in Cocaine from Drug-Smuggling Boat North of Puerto Rico",
    "NOAA Launches Deep-Sea Mapping Project Off American Samoa as Critical Minerals Race Accelerates",
];

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed returned {status}")]
    Server { status: u16 },
    #[error("feed is not valid XML: {0}")]
    Xml(String),
    #[error("feed contained no headlines")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub feed_url: String,
    pub limit: usize,
    pub timeout: Duration,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            limit: DEFAULT_HEADLINE_LIMIT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Where a set of headlines came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadlineSource {
    Live,
    /// The feed failed; the message says why.
    Fallback(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headlines {
    pub items: Vec<String>,
    pub source: HeadlineSource,
}

impl Headlines {
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            items: FALLBACK_HEADLINES.iter().map(|s| s.to_string()).collect(),
            source: HeadlineSource::Fallback(reason.into()),
        }
    }

    pub fn is_live(&self) -> bool {
        self.source == HeadlineSource::Live
    }
}

pub struct NewsClient {
    client: reqwest::Client,
    config: NewsConfig,
}

impl NewsClient {
    pub fn new(config: NewsConfig) -> Result<Self, NewsError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &NewsConfig {
        &self.config
    }

    /// Fetch the feed once and extract up to `limit` headlines.
    pub async fn fetch_headlines(&self) -> Result<Vec<String>, NewsError> {
        info!(url = %self.config.feed_url, "fetching news feed");
        let resp = self.client.get(&self.config.feed_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NewsError::Server {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        let headlines = extract_headlines(&body, self.config.limit)?;
        if headlines.is_empty() {
            return Err(NewsError::Empty);
        }
        info!(count = headlines.len(), "mined headlines");
        Ok(headlines)
    }

    /// Live headlines, or [`FALLBACK_HEADLINES`] if the fetch fails for any reason.
    pub async fn fetch_or_fallback(&self) -> Headlines {
        match self.fetch_headlines().await {
            Ok(items) => Headlines {
                items,
                source: HeadlineSource::Live,
            },
            Err(e) => {
                warn!(error = %e, "news feed unavailable, using simulated headlines");
                Headlines::fallback(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_headlines_are_marked() {
        let h = Headlines::fallback("feed returned 403");
        assert_eq!(h.items.len(), FALLBACK_HEADLINES.len());
        assert!(!h.is_live());
        assert_eq!(
            h.source,
            HeadlineSource::Fallback("feed returned 403".to_string())
        );
    }

    #[test]
    fn default_config() {
        let config = NewsConfig::default();
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.limit, 5);
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn unreachable_feed_falls_back() {
        let client = NewsClient::new(NewsConfig {
            feed_url: "http://127.0.0.1:9/feed".into(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(
            client.fetch_headlines().await,
            Err(NewsError::Http(_))
        ));

        let headlines = client.fetch_or_fallback().await;
        assert!(!headlines.is_live());
        assert_eq!(headlines.items[0], FALLBACK_HEADLINES[0]);
    }
}

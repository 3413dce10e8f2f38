//! News layer: logistics headlines mined from an RSS feed, with simulated
//! headlines standing in when the feed is unreachable.

mod client;
mod rss;

pub use client::{
    DEFAULT_FEED_URL, DEFAULT_HEADLINE_LIMIT, FALLBACK_HEADLINES, HeadlineSource, Headlines,
    NewsClient, NewsConfig, NewsError,
};
pub use rss::extract_headlines;

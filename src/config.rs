//! Configuration types for reply-harvest

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest accepted `max_depth`.
///
/// Each level of reply nesting costs five levels of JSON nesting, and `serde_json`
/// rejects bodies nested deeper than 128. Past this ceiling a too-deep thread fails
/// as an unreadable body before the depth guard ever sees it.
pub const MAX_DEPTH_CEILING: usize = 20;

/// Where to harvest from and how to shape the requests
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the API, e.g. `https://www.reddit.com/r/rust`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Which listing to fetch (default: hot)
    #[serde(default)]
    pub listing: ListingCategory,

    /// Sort order requested for each item's reply tree (default: confidence)
    #[serde(default)]
    pub sort: ReplySort,

    /// Number of items requested from the listing (default: 25)
    #[serde(default = "default_listing_limit")]
    pub listing_limit: u32,

    /// Number of replies requested per detail fetch (default: 100)
    #[serde(default = "default_detail_limit")]
    pub detail_limit: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing: ListingCategory::default(),
            sort: ReplySort::default(),
            listing_limit: default_listing_limit(),
            detail_limit: default_detail_limit(),
        }
    }
}

/// Transport and fan-out settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum detail fetches in flight at once (default: 16)
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration for [`Harvester`](crate::Harvester)
///
/// Sub-configs are flattened for serialization, so a config document is a single
/// flat JSON object:
///
/// ```json
/// { "base_url": "https://www.reddit.com/r/rust", "listing": "top", "sort": "new",
///   "listing_limit": 10, "max_concurrent_fetches": 4, "max_depth": 8 }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Source API and request shaping
    #[serde(flatten)]
    pub source: SourceConfig,

    /// Transport and concurrency settings
    #[serde(flatten)]
    pub fetch: FetchConfig,

    /// Deepest reply nesting the flattener will walk before giving up
    /// (default: 16, at most [`MAX_DEPTH_CEILING`])
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            fetch: FetchConfig::default(),
            max_depth: default_max_depth(),
        }
    }
}

impl Config {
    /// Check that every setting is usable
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.source.listing_limit == 0 {
            return Err(Error::config("listing_limit", "must be greater than zero"));
        }
        if self.source.detail_limit == 0 {
            return Err(Error::config("detail_limit", "must be greater than zero"));
        }
        if self.fetch.max_concurrent_fetches == 0 {
            return Err(Error::config("max_concurrent_fetches", "must be greater than zero"));
        }
        if self.max_depth == 0 {
            return Err(Error::config("max_depth", "must be greater than zero"));
        }
        if self.max_depth > MAX_DEPTH_CEILING {
            return Err(Error::config(
                "max_depth",
                format!("must be at most {}", MAX_DEPTH_CEILING),
            ));
        }
        crate::endpoints::Endpoints::new(&self.source).map(|_| ())
    }
}

/// Listing to fetch from the source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingCategory {
    /// Highest scored
    Top,
    /// Currently trending (default)
    #[default]
    Hot,
    /// Most recent
    New,
    /// Gaining traction
    Rising,
    /// Random selection
    Random,
}

impl ListingCategory {
    /// Path segment used in the listing URL
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingCategory::Top => "top",
            ListingCategory::Hot => "hot",
            ListingCategory::New => "new",
            ListingCategory::Rising => "rising",
            ListingCategory::Random => "random",
        }
    }
}

/// Sort order for an item's reply tree
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySort {
    /// Best replies first (default)
    #[default]
    Confidence,
    /// Highest scored
    Top,
    /// Most recent
    New,
    /// Most divisive
    Controversial,
    /// Oldest first
    Old,
    /// Random order
    Random,
    /// Question and answer threading
    Qa,
    /// Live thread order
    Live,
}

impl ReplySort {
    /// Value of the `sort` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySort::Confidence => "confidence",
            ReplySort::Top => "top",
            ReplySort::New => "new",
            ReplySort::Controversial => "controversial",
            ReplySort::Old => "old",
            ReplySort::Random => "random",
            ReplySort::Qa => "qa",
            ReplySort::Live => "live",
        }
    }
}

fn default_base_url() -> String {
    "https://www.reddit.com/r/all".to_string()
}

fn default_listing_limit() -> u32 {
    25
}

fn default_detail_limit() -> u32 {
    100
}

fn default_max_concurrent_fetches() -> usize {
    16
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("reply-harvest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_depth() -> usize {
    16
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.source.listing, ListingCategory::Hot);
        assert_eq!(config.source.sort, ReplySort::Confidence);
        assert_eq!(config.source.listing_limit, 25);
        assert_eq!(config.source.detail_limit, 100);
        assert_eq!(config.fetch.max_concurrent_fetches, 16);
        assert_eq!(config.fetch.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_depth, 16);
        config.validate().unwrap();
    }

    #[test]
    fn flat_document_fills_nested_sub_configs() {
        let config: Config = serde_json::from_str(
            r#"{
                "base_url": "https://api.example.com/r/rust",
                "listing": "rising",
                "sort": "qa",
                "listing_limit": 5,
                "request_timeout": 7,
                "max_depth": 8
            }"#,
        )
        .unwrap();

        assert_eq!(config.source.base_url, "https://api.example.com/r/rust");
        assert_eq!(config.source.listing, ListingCategory::Rising);
        assert_eq!(config.source.sort, ReplySort::Qa);
        assert_eq!(config.source.listing_limit, 5);
        assert_eq!(config.fetch.request_timeout, Duration::from_secs(7));
        assert_eq!(config.max_depth, 8);
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let result: std::result::Result<Config, _> =
            serde_json::from_str(r#"{ "sort": "best" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_zero_values() {
        let cases: [(&str, fn(&mut Config)); 4] = [
            ("listing_limit", |c| c.source.listing_limit = 0),
            ("detail_limit", |c| c.source.detail_limit = 0),
            ("max_concurrent_fetches", |c| c.fetch.max_concurrent_fetches = 0),
            ("max_depth", |c| c.max_depth = 0),
        ];

        for (expected_key, mutate) in cases {
            let mut config = Config::default();
            mutate(&mut config);
            match config.validate() {
                Err(Error::Config { key, .. }) => {
                    assert_eq!(key.as_deref(), Some(expected_key));
                }
                other => panic!("expected config error for {expected_key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn validate_caps_max_depth() {
        let mut config = Config::default();
        config.max_depth = MAX_DEPTH_CEILING;
        config.validate().unwrap();

        config.max_depth = MAX_DEPTH_CEILING + 1;
        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("max_depth")),
            other => panic!("expected config error for max_depth, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_unparsable_base_url() {
        let mut config = Config::default();
        config.source.base_url = "not a url".to_string();

        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn enum_path_segments_match_wire_names() {
        assert_eq!(ListingCategory::Random.as_str(), "random");
        assert_eq!(ReplySort::Controversial.as_str(), "controversial");
        assert_eq!(serde_json::to_string(&ReplySort::Live).unwrap(), "\"live\"");
    }
}

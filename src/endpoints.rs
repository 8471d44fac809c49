//! URL construction for listing and detail requests

use url::Url;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::types::ItemId;

/// Builds request URLs for one source configuration
#[derive(Clone, Debug)]
pub struct Endpoints {
    base: Url,
    listing: &'static str,
    sort: &'static str,
    listing_limit: u32,
    detail_limit: u32,
}

impl Endpoints {
    /// Parse and check the base URL of `source`
    ///
    /// # Errors
    /// Returns [`Error::Config`] for `base_url` if it does not parse, is not
    /// http(s), or cannot carry path segments.
    pub fn new(source: &SourceConfig) -> Result<Self> {
        let base = Url::parse(&source.base_url)
            .map_err(|e| Error::config("base_url", format!("invalid URL: {}", e)))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::config(
                "base_url",
                format!("unsupported scheme '{}'", base.scheme()),
            ));
        }
        if base.cannot_be_a_base() {
            return Err(Error::config("base_url", "URL cannot carry a path"));
        }

        Ok(Self {
            base,
            listing: source.listing.as_str(),
            sort: source.sort.as_str(),
            listing_limit: source.listing_limit,
            detail_limit: source.detail_limit,
        })
    }

    /// `{base}/{listing}.json?limit={listing_limit}`
    pub fn listing_url(&self) -> Url {
        let mut url = self.with_segments(&[format!("{}.json", self.listing).as_str()]);
        url.query_pairs_mut()
            .append_pair("limit", &self.listing_limit.to_string());
        url
    }

    /// `{base}/comments/{id}.json?sort={sort}&limit={detail_limit}`
    ///
    /// The id is pushed as a single percent-encoded path segment.
    pub fn detail_url(&self, id: &ItemId) -> Url {
        let mut url = self.with_segments(&["comments", format!("{}.json", id).as_str()]);
        url.query_pairs_mut()
            .append_pair("sort", self.sort)
            .append_pair("limit", &self.detail_limit.to_string());
        url
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // cannot_be_a_base was rejected in new(), so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

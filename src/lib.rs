//! # reply-harvest
//!
//! Concurrent listing and reply-tree harvester for paginated JSON APIs.
//!
//! A harvest fetches one listing, fans out one detail fetch per listed item, flattens
//! every item's nested reply tree, and merges the results into a single deduplicated
//! [`LeafSet`]. The completion fires exactly once, after the last item resolves.
//!
//! ## Design Philosophy
//!
//! - **Best-effort fan-out** - A failing item is recorded and skipped; only a failed
//!   listing aborts the run
//! - **Tolerant decoding** - Malformed optional fields read as absent, malformed
//!   required fields fail the response
//! - **Library-first** - No CLI or UI, the transport is a trait you can replace
//!
//! ## Quick Start
//!
//! ```no_run
//! use reply_harvest::{Config, Harvester};
//! use reply_harvest::config::{ListingCategory, ReplySort};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.source.base_url = "https://www.reddit.com/r/rust".to_string();
//!     config.source.listing = ListingCategory::Top;
//!     config.source.sort = ReplySort::Top;
//!
//!     let harvester = Harvester::from_config(config)?;
//!     let harvest = harvester.harvest().await?;
//!
//!     println!("{}", serde_json::to_string_pretty(&harvest.replies)?);
//!     for failure in &harvest.failures {
//!         eprintln!("{}: {}", failure.item, failure.error);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Raw JSON to typed record decoding
pub mod decode;
/// Request URL construction
pub mod endpoints;
/// Error types
pub mod error;
/// Reply-tree flattening
pub mod flatten;
/// Listing and detail fetch orchestration
pub mod harvester;
/// JSON transport abstraction and HTTP implementation
pub mod transport;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::{Config, FetchConfig, ListingCategory, ReplySort, SourceConfig};
pub use decode::Decode;
pub use error::{DecodeError, Error, Result, StructuralError, TransportError};
pub use flatten::flatten;
pub use harvester::Harvester;
pub use transport::{HttpFetcher, JsonFetcher};
pub use types::{
    DetailResponse, Harvest, ItemFailure, ItemId, LeafRecord, LeafSet, ListingItem,
    ListingResponse, TreeNode,
};

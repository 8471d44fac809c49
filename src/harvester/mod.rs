//! Fetch orchestration: one listing fetch fanned out into concurrent detail fetches.
//!
//! Phases of a run:
//! 1. Fetch and decode the listing (failure here is fatal to the run)
//! 2. Complete immediately if the listing is empty
//! 3. Spawn one task per distinct item; each waits for a fetch permit, fetches the
//!    item's reply tree, decodes and flattens it
//! 4. Each task hands its outcome to the shared [`RunState`], which fires the
//!    completion exactly once when the last item resolves
//!
//! Per-item failures never abort the run; they are reported in [`Harvest::failures`].

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Semaphore, oneshot};
use url::Url;

use crate::config::Config;
use crate::decode::Decode;
use crate::endpoints::Endpoints;
use crate::error::{Error, Result};
use crate::flatten::flatten;
use crate::transport::{HttpFetcher, JsonFetcher};
use crate::types::{DetailResponse, Harvest, LeafSet, ListingItem, ListingResponse};

mod run;

use run::RunState;


/// Harvests deduplicated replies for every item of a listing
///
/// Cheap to clone; clones share the transport and the fetch permit pool, so the
/// concurrency limit applies across every run started from the same harvester.
#[derive(Clone)]
pub struct Harvester {
    config: Arc<Config>,
    endpoints: Endpoints,
    fetcher: Arc<dyn JsonFetcher>,
    fetch_permits: Arc<Semaphore>,
}

impl Harvester {
    /// Create a harvester over a custom transport
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the configuration does not validate.
    pub fn new(config: Config, fetcher: Arc<dyn JsonFetcher>) -> Result<Self> {
        config.validate()?;
        let endpoints = Endpoints::new(&config.source)?;
        let fetch_permits = Arc::new(Semaphore::new(config.fetch.max_concurrent_fetches));

        Ok(Self {
            config: Arc::new(config),
            endpoints,
            fetcher,
            fetch_permits,
        })
    }

    /// Create a harvester that fetches over HTTP
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the configuration does not validate or the
    /// HTTP client cannot be built.
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Self::new(config, Arc::new(fetcher))
    }

    /// The configuration this harvester was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a harvest and wait for its result
    ///
    /// # Errors
    /// Returns the listing's transport or decode error. Per-item failures are
    /// reported in [`Harvest::failures`] instead.
    pub async fn harvest(&self) -> Result<Harvest> {
        let (tx, rx) = oneshot::channel();
        self.harvest_with(move |result| {
            tx.send(result).ok();
        })
        .await;
        rx.await.map_err(|_| Error::Aborted)?
    }

    /// Run a harvest, delivering the result to `on_complete`
    ///
    /// Returns once the listing has been handled and every detail fetch has been
    /// dispatched. `on_complete` is invoked exactly once: directly from this call
    /// for a failed or empty listing, otherwise from whichever worker task resolves
    /// the last item.
    pub async fn harvest_with<C>(&self, on_complete: C)
    where
        C: FnOnce(Result<Harvest>) + Send + 'static,
    {
        let listing_url = self.endpoints.listing_url();
        tracing::info!(url = %listing_url, "Starting harvest");

        let items = match self.fetch_listing(&listing_url).await {
            Ok(items) => distinct_items(items),
            Err(e) => {
                tracing::error!(url = %listing_url, error = %e, "Listing fetch failed");
                on_complete(Err(e));
                return;
            }
        };

        if items.is_empty() {
            tracing::info!(url = %listing_url, "Listing is empty, nothing to harvest");
            on_complete(Ok(Harvest::default()));
            return;
        }

        tracing::debug!(items = items.len(), "Dispatching detail fetches");
        let run = Arc::new(RunState::new(
            items.iter().map(|item| item.id.clone()),
            Box::new(on_complete),
        ));

        for item in items {
            let task = DetailTask {
                url: self.endpoints.detail_url(&item.id),
                item,
                fetcher: Arc::clone(&self.fetcher),
                fetch_permits: Arc::clone(&self.fetch_permits),
                max_depth: self.config.max_depth,
            };
            let run = Arc::clone(&run);

            tokio::spawn(async move {
                let outcome = match AssertUnwindSafe(task.fetch_replies()).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(panic) => Err(Error::Panicked(panic_message(panic.as_ref()))),
                };

                match &outcome {
                    Ok(replies) => tracing::debug!(
                        item_id = %task.item.id,
                        replies = replies.len(),
                        "Item harvested"
                    ),
                    Err(e) => tracing::warn!(
                        item_id = %task.item.id,
                        url = %task.url,
                        error = %e,
                        "Item failed, continuing without it"
                    ),
                }

                run.resolve(&task.item.id, outcome).await;
            });
        }
    }

    async fn fetch_listing(&self, url: &Url) -> Result<Vec<ListingItem>> {
        let raw = self.fetcher.fetch_json(url).await?;
        Ok(ListingResponse::decode(&raw)?.into_items())
    }
}

/// Everything one item's worker task needs
struct DetailTask {
    item: ListingItem,
    url: Url,
    fetcher: Arc<dyn JsonFetcher>,
    fetch_permits: Arc<Semaphore>,
    max_depth: usize,
}

impl DetailTask {
    async fn fetch_replies(&self) -> Result<LeafSet> {
        let raw = {
            let _permit = self
                .fetch_permits
                .acquire()
                .await
                .map_err(|_| Error::Aborted)?;
            self.fetcher.fetch_json(&self.url).await?
        };

        let detail = DetailResponse::decode(&raw)?;
        if detail.item.id != self.item.id {
            tracing::debug!(
                item_id = %self.item.id,
                echoed_id = %detail.item.id,
                "Detail response echoed a different item"
            );
        }

        Ok(flatten(&detail.replies, self.max_depth)?)
    }
}

/// Drop repeated ids so every outstanding entry maps to exactly one fetch
fn distinct_items(items: Vec<ListingItem>) -> Vec<ListingItem> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| {
            let first = seen.insert(item.id.clone());
            if !first {
                tracing::debug!(item_id = %item.id, "Skipping duplicate listing item");
            }
            first
        })
        .collect()
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

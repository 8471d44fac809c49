//! Per-run shared state: outstanding items, aggregated replies and the completion slot.
//!
//! All of it lives behind one lock. Each item's resolution merges its result, removes
//! the item from the outstanding set, and checks for emptiness in a single critical
//! section, so the completion can neither fire twice nor miss a late merge.

use std::collections::HashSet;

use tokio::sync::Mutex;

use crate::error::Result;
use crate::types::{Harvest, ItemFailure, ItemId, LeafSet};

/// Terminal callback of a harvest run
pub(crate) type Completion = Box<dyn FnOnce(Result<Harvest>) + Send + 'static>;

/// Shared state of one harvest run
pub(crate) struct RunState {
    inner: Mutex<RunInner>,
}

struct RunInner {
    outstanding: HashSet<ItemId>,
    collected: LeafSet,
    failures: Vec<ItemFailure>,
    items: usize,
    completion: Option<Completion>,
}

impl RunState {
    /// Start a run waiting on `items`
    pub(crate) fn new(items: impl IntoIterator<Item = ItemId>, completion: Completion) -> Self {
        let outstanding: HashSet<ItemId> = items.into_iter().collect();
        Self {
            inner: Mutex::new(RunInner {
                items: outstanding.len(),
                outstanding,
                collected: LeafSet::new(),
                failures: Vec::new(),
                completion: Some(completion),
            }),
        }
    }

    /// Record the outcome of one item's detail fetch.
    ///
    /// Items that are not outstanding (unknown, or already resolved) are ignored.
    /// The call that empties the outstanding set takes the completion and invokes it
    /// after releasing the lock.
    pub(crate) async fn resolve(&self, item: &ItemId, outcome: Result<LeafSet>) {
        let finished = {
            let mut inner = self.inner.lock().await;

            if !inner.outstanding.remove(item) {
                tracing::warn!(
                    item_id = %item,
                    "Ignoring resolution for item that is not outstanding"
                );
                return;
            }

            match outcome {
                Ok(replies) => inner.collected.merge(replies),
                Err(error) => inner.failures.push(ItemFailure {
                    item: item.clone(),
                    error,
                }),
            }

            if inner.outstanding.is_empty() {
                inner.completion.take().map(|completion| {
                    let harvest = Harvest {
                        replies: std::mem::take(&mut inner.collected),
                        failures: std::mem::take(&mut inner.failures),
                        items: inner.items,
                    };
                    (completion, harvest)
                })
            } else {
                None
            }
        };

        if let Some((completion, harvest)) = finished {
            tracing::info!(
                items = harvest.items,
                failed = harvest.failures.len(),
                replies = harvest.replies.len(),
                "Harvest complete"
            );
            completion(Ok(harvest));
        }
    }

    /// Number of items still awaiting resolution
    #[cfg(test)]
    pub(crate) async fn outstanding(&self) -> usize {
        self.inner.lock().await.outstanding.len()
    }
}

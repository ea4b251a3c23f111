use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::{SearchCriteria, SearchResultEntry};

/// Issued when a search starts; only the newest ticket per user may publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    owner: String,
    generation: u64,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Results of the most recent completed search for one user
#[derive(Debug, Clone)]
pub struct PublishedResults {
    pub generation: u64,
    pub criteria: SearchCriteria,
    pub entries: Arc<Vec<SearchResultEntry>>,
}

#[derive(Debug, Default)]
struct Slot {
    latest_started: u64,
    published: Option<PublishedResults>,
}

/// Last-write-wins result board keyed by searching user.
///
/// In-flight searches are never cancelled; a search that finishes after a
/// newer one has started is simply refused when it tries to publish.
#[derive(Debug, Default)]
pub struct LatestResults {
    next_generation: AtomicU64,
    slots: Mutex<HashMap<String, Slot>>,
}

impl LatestResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new search for `owner`, superseding any still running
    pub async fn begin(&self, owner: &str) -> SearchTicket {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut slots = self.slots.lock().await;
        slots.entry(owner.to_string()).or_default().latest_started = generation;

        SearchTicket {
            owner: owner.to_string(),
            generation,
        }
    }

    /// Replace the owner's results if `ticket` is still the newest search.
    ///
    /// Returns `false` and discards the results when the search was superseded.
    pub async fn publish(
        &self,
        ticket: &SearchTicket,
        criteria: SearchCriteria,
        entries: Arc<Vec<SearchResultEntry>>,
    ) -> bool {
        let mut slots = self.slots.lock().await;
        let Some(slot) = slots.get_mut(&ticket.owner) else {
            return false;
        };

        if slot.latest_started != ticket.generation {
            tracing::debug!(
                "Discarding stale search {} for {} (latest is {})",
                ticket.generation,
                ticket.owner,
                slot.latest_started
            );
            return false;
        }

        slot.published = Some(PublishedResults {
            generation: ticket.generation,
            criteria,
            entries,
        });
        true
    }

    pub async fn latest(&self, owner: &str) -> Option<PublishedResults> {
        let slots = self.slots.lock().await;
        slots.get(owner).and_then(|slot| slot.published.clone())
    }

    /// Forget everything for `owner`; running searches will fail to publish
    pub async fn clear(&self, owner: &str) {
        self.slots.lock().await.remove(owner);
    }
}

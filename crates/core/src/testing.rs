//! In-memory fetcher for tests and benchmarks (`test-util` feature)

use crate::category::{CategoryId, CategoryRecord};
use crate::fetch::{CategoryFetcher, FetchError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, thiserror::Error)]
#[error("injected fetch failure for {0}")]
struct InjectedFailure(String);

/// In-memory fetcher over a fixed list of records
///
/// Children are returned in the order they appear in the list. Counts
/// calls and concurrent fetches, and can fail chosen parents.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    records: Vec<CategoryRecord>,
    failing: HashSet<Option<CategoryId>>,
    yield_each_fetch: bool,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StaticFetcher {
    pub fn new(records: Vec<CategoryRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Make every fetch of `parent`'s children fail
    pub fn fail_on(mut self, parent: Option<CategoryId>) -> Self {
        self.failing.insert(parent);
        self
    }

    /// Suspend once inside every fetch so concurrent fetches overlap
    pub fn yielding(mut self) -> Self {
        self.yield_each_fetch = true;
        self
    }

    /// Number of fetches issued so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of fetches observed in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CategoryFetcher for StaticFetcher {
    async fn children(&self, parent: Option<&CategoryId>) -> Result<Vec<CategoryRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.yield_each_fetch {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&parent.cloned()) {
            let name = parent.map(|p| p.to_string()).unwrap_or_default();
            return Err(Box::new(InjectedFailure(name)));
        }

        Ok(self
            .records
            .iter()
            .filter(|r| r.parent_id.as_ref() == parent)
            .cloned()
            .collect())
    }
}

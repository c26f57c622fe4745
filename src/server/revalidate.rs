//! Time-based revalidation of rendered pages
//!
//! A page is fresh for `ttl` after it was rendered. A stale page keeps being
//! served while exactly one regeneration runs. Routes without a page go
//! through the fallback states `Pending` and `Failed`.
//!
//! Not-found pages and failures are kept for at most `ttl` and at most
//! `max_missing` of them at once, oldest dropped first, so requests for
//! invented slugs cannot grow the cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::generator::{PageStatus, RenderedPage, Route};

/// Not-found and failed entries kept by default
pub const MAX_MISSING_PAGES: usize = 1024;

enum Entry {
    Ready {
        page: RenderedPage,
        rendered_at: Instant,
        regenerating: bool,
    },
    /// On-demand render in flight
    Pending,
    /// On-demand render failed or timed out
    Failed { at: Instant },
}

impl Entry {
    /// When an entry for a route without content was recorded
    fn missing_since(&self) -> Option<Instant> {
        match self {
            Entry::Ready {
                page,
                rendered_at,
                regenerating: false,
            } if page.status == PageStatus::NotFound => Some(*rendered_at),
            Entry::Failed { at } => Some(*at),
            _ => None,
        }
    }
}

/// What a request should do with a route
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Serve this page
    Fresh(RenderedPage),
    /// Serve this page and regenerate it in the background
    Stale(RenderedPage),
    /// Nothing cached; the caller now owns the on-demand render
    Claimed,
    /// Another request is rendering the route
    Pending,
    /// The last on-demand render failed; the entry has been dropped
    Failed,
}

/// Rendered pages keyed by route
pub struct PageCache {
    ttl: Duration,
    max_missing: usize,
    entries: Mutex<HashMap<Route, Entry>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_missing_limit(ttl, MAX_MISSING_PAGES)
    }

    pub fn with_missing_limit(ttl: Duration, max_missing: usize) -> Self {
        Self {
            ttl,
            max_missing,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a route, claiming whatever work the caller has to start
    pub async fn lookup(&self, route: &Route) -> Lookup {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(route) {
            Some(Entry::Ready {
                page,
                rendered_at,
                regenerating,
            }) => {
                if rendered_at.elapsed() < self.ttl || *regenerating {
                    Lookup::Fresh(page.clone())
                } else {
                    *regenerating = true;
                    Lookup::Stale(page.clone())
                }
            }
            Some(Entry::Pending) => Lookup::Pending,
            Some(Entry::Failed { .. }) => {
                entries.remove(route);
                Lookup::Failed
            }
            None => {
                entries.insert(route.clone(), Entry::Pending);
                Lookup::Claimed
            }
        }
    }

    /// Store a freshly rendered page
    pub async fn insert(&self, route: Route, page: RenderedPage) {
        let mut entries = self.entries.lock().await;
        self.drop_expired(&mut entries);
        entries.insert(
            route,
            Entry::Ready {
                page,
                rendered_at: Instant::now(),
                regenerating: false,
            },
        );
        self.enforce_limit(&mut entries);
    }

    /// Record a failed render; a stale page survives it
    pub async fn fail(&self, route: &Route) {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(route) {
            Some(Entry::Ready { regenerating, .. }) => *regenerating = false,
            Some(entry) => *entry = Entry::Failed { at: Instant::now() },
            None => {}
        }
        self.enforce_limit(&mut entries);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn drop_expired(&self, entries: &mut HashMap<Route, Entry>) {
        let ttl = self.ttl;
        entries.retain(|_, entry| match entry.missing_since() {
            Some(since) => since.elapsed() < ttl,
            None => true,
        });
    }

    fn enforce_limit(&self, entries: &mut HashMap<Route, Entry>) {
        let mut missing: Vec<(Instant, Route)> = entries
            .iter()
            .filter_map(|(route, entry)| entry.missing_since().map(|at| (at, route.clone())))
            .collect();
        if missing.len() <= self.max_missing {
            return;
        }
        missing.sort_by_key(|(at, _)| *at);
        let excess = missing.len() - self.max_missing;
        for (_, route) in missing.into_iter().take(excess) {
            tracing::debug!("Evicting {} from the page cache", route);
            entries.remove(&route);
        }
    }
}

//! Debounced product search
//!
//! Keystrokes go into a [`SearchDebouncer`], which only lets a query through
//! once input has been quiet for the configured delay. Every request that is
//! actually issued gets a [`SearchTicket`]; only the newest ticket may replace
//! the visible product list, whatever order the responses come back in.

use std::time::Duration;

use shared::Product;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::{CatalogApi, ClientResult, Operation};

/// What a fired search asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Blank input: reload the whole product collection
    All,
    /// Filtered search on the trimmed term
    Term(String),
}

impl SearchQuery {
    pub fn from_input(raw: &str) -> Self {
        match raw.trim() {
            "" => SearchQuery::All,
            term => SearchQuery::Term(term.to_string()),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            SearchQuery::All => Operation::LoadProducts,
            SearchQuery::Term(_) => Operation::SearchProducts,
        }
    }
}

/// Issue the request behind `query`
pub async fn fetch_products<A: CatalogApi + ?Sized>(
    api: &A,
    query: &SearchQuery,
) -> ClientResult<Vec<Product>> {
    match query {
        SearchQuery::All => api.list_products().await,
        SearchQuery::Term(term) => api.search_products(term).await,
    }
}

// ============================================================================
// Debouncer
// ============================================================================

/// Debouncer state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    /// A timer is armed for this raw input
    Pending { input: String },
}

struct Timer {
    input: String,
    handle: JoinHandle<()>,
}

/// Turns a stream of input changes into at most one query per quiet period.
///
/// Each change aborts the armed timer before arming a new one, so a
/// superseded input never produces a query. Must be used inside a tokio
/// runtime.
pub struct SearchDebouncer {
    delay: Duration,
    tx: mpsc::UnboundedSender<SearchQuery>,
    timer: Option<Timer>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration, tx: mpsc::UnboundedSender<SearchQuery>) -> Self {
        Self {
            delay,
            tx,
            timer: None,
        }
    }

    /// Debouncer plus the receiving end of its fired queries
    pub fn channel(delay: Duration) -> (Self, mpsc::UnboundedReceiver<SearchQuery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(delay, tx), rx)
    }

    /// Record a new value of the search field
    pub fn input(&mut self, raw: impl Into<String>) {
        self.cancel();

        let input = raw.into();
        let query = SearchQuery::from_input(&input);
        let deadline = Instant::now() + self.delay;
        let tx = self.tx.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            tracing::debug!(?query, "search input settled");
            let _ = tx.send(query);
        });

        self.timer = Some(Timer { input, handle });
    }

    /// Drop the armed timer. Returns whether one was still pending.
    pub fn cancel(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                let pending = !timer.handle.is_finished();
                timer.handle.abort();
                pending
            }
            None => false,
        }
    }

    pub fn state(&self) -> DebounceState {
        match &self.timer {
            Some(timer) if !timer.handle.is_finished() => DebounceState::Pending {
                input: timer.input.clone(),
            },
            _ => DebounceState::Idle,
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Last-issued-wins sequencing
// ============================================================================

/// Identity of an issued product request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// Hands out tickets and remembers which one is newest
#[derive(Debug, Default)]
pub struct SearchSequencer {
    issued: u64,
}

impl SearchSequencer {
    pub fn issue(&mut self) -> SearchTicket {
        self.issued += 1;
        SearchTicket(self.issued)
    }

    pub fn is_latest(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.issued
    }
}

/// A product request that has been issued but not yet applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    pub ticket: SearchTicket,
    pub query: SearchQuery,
}

/// Result of applying a product response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The response replaced the product list
    Applied { count: usize },
    /// A newer request was issued since; the response was dropped
    Stale,
}

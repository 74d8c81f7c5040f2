//! Client-side request coordination: debouncing filter changes and
//! discarding responses to superseded requests.
//!
//! Cancellation here is advisory. Nothing is aborted in the store; these
//! types only decide which response is allowed to reach UI state.

pub mod debounce;

use std::sync::atomic::{AtomicU64, Ordering};

pub use debounce::Debouncer;

use crate::codec;
use crate::filter::FilterModel;
use crate::listing::ListingPage;

/// Monotonic identifier of an issued listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// Identity of one in-flight request: its sequence number and the canonical
/// query it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub id: RequestId,
    pub query: String,
}

/// Tracks the most recently issued request.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request, superseding all earlier ones.
    pub fn begin(&self, model: &FilterModel) -> RequestTicket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket {
            id: RequestId(id),
            query: codec::encode(model),
        }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.id.0
    }

    /// Pass a response through only if it answers the latest request.
    pub fn accept(&self, ticket: &RequestTicket, page: ListingPage) -> Option<ListingPage> {
        if self.is_current(ticket) {
            Some(page)
        } else {
            tracing::debug!(
                request = ticket.id.0,
                query = %page.query,
                "Discarding stale listing response"
            );
            None
        }
    }
}

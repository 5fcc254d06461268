//! Feature modules implementing the coversum API
//!
//! Each feature is a vertical slice with its own commands (writes),
//! queries (reads), and routes, following a CQRS layout:
//!
//! - **summaries**: the upload-and-status lifecycle of a book-cover
//!   submission (upload, completion callback, status query)

pub mod shared;
pub mod summaries;

use crate::forward::Forwarder;
use crate::store::SharedSummaryStore;
use axum::Router;

/// Shared state for all feature routes
///
/// Constructed once in `main` (or a test harness) and injected; handlers
/// never reach for a process-wide store instance.
#[derive(Clone)]
pub struct FeatureState {
    /// Record store handle (PostgreSQL in production, in-memory in tests)
    pub store: SharedSummaryStore,
    /// Client for the external processing webhook
    pub forwarder: Forwarder,
}

/// Creates the API router with all feature routes mounted
///
/// State is applied by the caller once the full application router is
/// assembled.
pub fn router() -> Router<FeatureState> {
    Router::new().merge(summaries::summaries_routes())
}

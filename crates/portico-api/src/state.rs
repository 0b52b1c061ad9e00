//! Shared application state.

use std::sync::Arc;

use portico_analytics::AnalyticsStore;
use portico_core::clock::Clock;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide analytics store.
    pub analytics: Arc<AnalyticsStore>,
    /// Clock used for ingestion stamps and query windows.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(analytics: Arc<AnalyticsStore>, clock: Arc<dyn Clock>) -> Self {
        Self { analytics, clock }
    }
}

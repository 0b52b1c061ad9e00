//! Append-only event log and per-business metric accumulators.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::SecondsFormat;
use portico_core::clock::Clock;
use portico_core::error::DomainError;
use portico_core::event::{Event, Properties, PropertyValue, TIMESTAMP_KEY};
use portico_core::timeframe::Timeframe;
use serde::Serialize;

use crate::dashboard::{self, MetricsBundle};
use crate::platform::{self, PlatformBundle};

/// Event name bumping the `views` counter.
pub const LISTING_VIEWED: &str = "business_listing_viewed";
/// Event name bumping the `contacts` counter.
pub const CONTACT_CLICKED: &str = "business_contact_clicked";
/// Event name bumping the `registrations` counter.
pub const REGISTRATION_STARTED: &str = "business_registration_started";
/// Event name bumping the `completions` counter.
pub const REGISTRATION_COMPLETED: &str = "business_registration_completed";
/// Event name carrying a `searchTerm` property.
pub const SEARCH_PERFORMED: &str = "search_performed";

/// Running counters for a single business, bumped as events arrive.
///
/// Created lazily on the first event that references the business id and
/// never deleted afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusinessMetrics {
    /// `business_listing_viewed` events seen.
    pub views: u64,
    /// `business_contact_clicked` events seen.
    pub contacts: u64,
    /// `business_registration_started` events seen.
    pub registrations: u64,
    /// `business_registration_completed` events seen.
    pub completions: u64,
}

#[derive(Debug, Default)]
struct Inner {
    events: Vec<Event>,
    metrics: HashMap<String, BusinessMetrics>,
}

/// Process-wide analytics state: the event log plus the accumulator map.
///
/// Both live behind one mutex so that an append and its accumulator bump form
/// a single critical section; readers see either both effects of a record or
/// neither. The log is unbounded and never pruned.
#[derive(Debug, Default)]
pub struct AnalyticsStore {
    inner: Mutex<Inner>,
}

impl AnalyticsStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, Inner> {
        // Counter state stays consistent across a poisoned lock (all writes
        // are plain arithmetic), so recover rather than propagate.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records an analytics event.
    ///
    /// Stamps `properties.timestamp` with ingestion-time UTC (overwriting any
    /// caller-supplied value), assigns an id derived from ingestion time in
    /// milliseconds, appends to the log, and bumps the matching accumulator
    /// counter when `properties.businessId` is a non-empty string. Same-
    /// millisecond id collisions are possible and accepted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when `name` is empty. Property
    /// shapes are otherwise stored as-is.
    pub fn record(
        &self,
        name: &str,
        mut properties: Properties,
        clock: &dyn Clock,
    ) -> Result<Event, DomainError> {
        if name.is_empty() {
            return Err(DomainError::Validation(
                "event name must not be empty".to_owned(),
            ));
        }

        let now = clock.now();
        properties.insert(
            TIMESTAMP_KEY.to_owned(),
            PropertyValue::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        let event = Event {
            id: now.timestamp_millis().to_string(),
            name: name.to_owned(),
            properties,
        };

        let mut inner = self.locked();
        if let Some(business_id) = event.business_id() {
            let metrics = inner.metrics.entry(business_id.to_owned()).or_default();
            match event.name.as_str() {
                LISTING_VIEWED => metrics.views += 1,
                CONTACT_CLICKED => metrics.contacts += 1,
                REGISTRATION_STARTED => metrics.registrations += 1,
                REGISTRATION_COMPLETED => metrics.completions += 1,
                _ => {}
            }
        }
        inner.events.push(event.clone());
        drop(inner);

        tracing::debug!(event = %event.name, event_id = %event.id, "analytics event recorded");
        Ok(event)
    }

    /// Computes the dashboard metrics bundle for one business over the given
    /// timeframe. Unknown business ids yield an all-zero bundle.
    #[must_use]
    pub fn business_dashboard(
        &self,
        business_id: &str,
        timeframe: Timeframe,
        clock: &dyn Clock,
    ) -> MetricsBundle {
        let now = clock.now();
        let inner = self.locked();
        dashboard::compute(&inner.events, business_id, timeframe, now)
    }

    /// Computes platform-wide rollups across the entire log.
    #[must_use]
    pub fn platform_metrics(&self, clock: &dyn Clock) -> PlatformBundle {
        let now = clock.now();
        let inner = self.locked();
        platform::compute(&inner.events, inner.metrics.len(), now)
    }

    /// Number of events recorded so far.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.locked().events.len()
    }

    /// Snapshot of the accumulator for one business, when it exists.
    #[must_use]
    pub fn metrics_for(&self, business_id: &str) -> Option<BusinessMetrics> {
        self.locked().metrics.get(business_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use portico_core::event::{BUSINESS_ID_KEY, TIMESTAMP_KEY};
    use portico_test_support::FixedClock;

    use super::*;

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap())
    }

    fn business_props(business_id: &str) -> Properties {
        let mut props = Properties::new();
        props.insert(BUSINESS_ID_KEY.to_owned(), PropertyValue::from(business_id));
        props
    }

    #[test]
    fn test_record_appends_one_event_per_call() {
        let store = AnalyticsStore::new();
        let clock = fixed_clock();

        for i in 0..5 {
            store
                .record("page_viewed", Properties::new(), &clock)
                .unwrap();
            assert_eq!(store.event_count(), i + 1);
        }
    }

    #[test]
    fn test_record_overwrites_caller_timestamp() {
        let store = AnalyticsStore::new();
        let clock = fixed_clock();
        let mut props = Properties::new();
        props.insert(
            TIMESTAMP_KEY.to_owned(),
            PropertyValue::from("1999-01-01T00:00:00.000Z"),
        );

        let event = store.record("page_viewed", props, &clock).unwrap();

        assert_eq!(
            event.property(TIMESTAMP_KEY).and_then(|v| v.as_str()),
            Some("2026-08-30T12:00:00.000Z")
        );
    }

    #[test]
    fn test_record_assigns_millisecond_derived_id() {
        let store = AnalyticsStore::new();
        let clock = fixed_clock();

        let event = store
            .record("page_viewed", Properties::new(), &clock)
            .unwrap();

        assert_eq!(event.id, clock.0.timestamp_millis().to_string());
    }

    #[test]
    fn test_record_rejects_empty_name() {
        let store = AnalyticsStore::new();
        let clock = fixed_clock();

        let result = store.record("", Properties::new(), &clock);

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(store.event_count(), 0);
    }

    #[test]
    fn test_accumulator_maps_event_names_to_counters() {
        let store = AnalyticsStore::new();
        let clock = fixed_clock();

        for name in [
            LISTING_VIEWED,
            LISTING_VIEWED,
            CONTACT_CLICKED,
            REGISTRATION_STARTED,
            REGISTRATION_COMPLETED,
        ] {
            store.record(name, business_props("b1"), &clock).unwrap();
        }

        let metrics = store.metrics_for("b1").unwrap();
        assert_eq!(
            metrics,
            BusinessMetrics {
                views: 2,
                contacts: 1,
                registrations: 1,
                completions: 1,
            }
        );
    }

    #[test]
    fn test_accumulator_ignores_unmapped_event_names() {
        let store = AnalyticsStore::new();
        let clock = fixed_clock();

        store
            .record("session_started", business_props("b1"), &clock)
            .unwrap();

        // Record is lazy-created by the businessId but untouched by the name.
        assert_eq!(store.metrics_for("b1").unwrap(), BusinessMetrics::default());
        assert_eq!(store.event_count(), 1);
    }

    #[test]
    fn test_accumulator_untouched_without_business_id() {
        let store = AnalyticsStore::new();
        let clock = fixed_clock();

        store
            .record(LISTING_VIEWED, Properties::new(), &clock)
            .unwrap();
        store
            .record(LISTING_VIEWED, business_props(""), &clock)
            .unwrap();

        assert_eq!(store.metrics_for(""), None);
        assert_eq!(store.event_count(), 2);
    }

    #[test]
    fn test_dashboard_and_accumulator_agree_on_views() {
        let store = AnalyticsStore::new();
        let clock = fixed_clock();

        for _ in 0..5 {
            store
                .record(LISTING_VIEWED, business_props("b1"), &clock)
                .unwrap();
        }

        let bundle = store.business_dashboard("b1", Timeframe::Days30, &clock);
        assert_eq!(bundle.total_views, 5);
        assert_eq!(store.metrics_for("b1").unwrap().views, 5);
    }

    #[test]
    fn test_platform_metrics_sees_whole_log() {
        let store = AnalyticsStore::new();
        let clock = fixed_clock();

        store
            .record(LISTING_VIEWED, business_props("b1"), &clock)
            .unwrap();
        store
            .record(CONTACT_CLICKED, business_props("b1"), &clock)
            .unwrap();

        let bundle = store.platform_metrics(&clock);
        assert_eq!(bundle.total_events, 2);
        assert_eq!(bundle.total_businesses, 1);
        assert_eq!(bundle.event_breakdown[LISTING_VIEWED], 1);
        assert_eq!(bundle.event_breakdown[CONTACT_CLICKED], 1);
    }

    #[test]
    fn test_arbitrary_property_shapes_round_trip() {
        let store = AnalyticsStore::new();
        let clock = fixed_clock();
        let mut props: Properties = serde_json::from_str(
            r#"{"nested": {"deep": [1, 2, 3]}, "flag": true, "n": null}"#,
        )
        .unwrap();
        props.insert("businessId".to_owned(), PropertyValue::from("b1"));

        let event = store.record("custom_event", props.clone(), &clock).unwrap();

        for key in ["nested", "flag", "n", "businessId"] {
            assert_eq!(event.property(key), props.get(key));
        }
    }
}

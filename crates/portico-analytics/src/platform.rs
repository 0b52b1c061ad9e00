//! Platform-wide rollups across the entire event log.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use portico_core::event::{
    BUSINESS_ID_KEY, Event, PropertyValue, TIMESTAMP_KEY, USER_ID_KEY,
};
use serde::Serialize;

const RECENT_ACTIVITY_LIMIT: usize = 50;
const RECENT_ACTIVITY_WINDOW_HOURS: i64 = 24;

/// Projection of an event for the recent-activity feed. All other
/// properties are dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Event name.
    pub event: String,
    /// Ingestion timestamp, RFC 3339 UTC.
    pub timestamp: String,
    /// Acting user, when the event carried one.
    pub user_id: Option<PropertyValue>,
    /// Business the event referred to, when present.
    pub business_id: Option<PropertyValue>,
}

/// Global rollups over the whole log, unfiltered by business or window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformBundle {
    /// Total events recorded since process start.
    pub total_events: u64,
    /// Distinct non-null `userId` values seen across the log.
    pub unique_users: u64,
    /// Businesses with an accumulator record.
    pub total_businesses: u64,
    /// Occurrence count per event name across the whole log.
    pub event_breakdown: BTreeMap<String, u64>,
    /// Events of the last 24 hours, most recent first, at most 50.
    pub recent_activity: Vec<ActivityEntry>,
}

/// Computes platform rollups at `now`. `total_businesses` is the size of the
/// accumulator map, supplied by the store.
#[must_use]
pub fn compute(events: &[Event], total_businesses: usize, now: DateTime<Utc>) -> PlatformBundle {
    let mut unique_users: HashSet<String> = HashSet::new();
    let mut event_breakdown: BTreeMap<String, u64> = BTreeMap::new();
    for event in events {
        if let Some(user_id) = event.property(USER_ID_KEY)
            && !user_id.is_null()
        {
            unique_users.insert(user_id.to_canonical_string());
        }
        *event_breakdown.entry(event.name.clone()).or_insert(0) += 1;
    }

    PlatformBundle {
        total_events: events.len() as u64,
        unique_users: unique_users.len() as u64,
        total_businesses: total_businesses as u64,
        event_breakdown,
        recent_activity: recent_activity(events, now),
    }
}

/// Events within the last 24 hours, sorted most-recent-first. The stable
/// sort keeps insertion order among equal timestamps, and the feed is
/// truncated to 50 entries.
fn recent_activity(events: &[Event], now: DateTime<Utc>) -> Vec<ActivityEntry> {
    let cutoff = now - Duration::hours(RECENT_ACTIVITY_WINDOW_HOURS);
    let mut recent: Vec<(&Event, DateTime<Utc>)> = events
        .iter()
        .filter_map(|event| event.timestamp().map(|ts| (event, ts)))
        .filter(|(_, ts)| *ts >= cutoff)
        .collect();
    recent.sort_by(|a, b| b.1.cmp(&a.1));
    recent.truncate(RECENT_ACTIVITY_LIMIT);

    recent
        .into_iter()
        .map(|(event, _)| ActivityEntry {
            event: event.name.clone(),
            timestamp: event
                .property(TIMESTAMP_KEY)
                .and_then(PropertyValue::as_str)
                .unwrap_or_default()
                .to_owned(),
            user_id: event.property(USER_ID_KEY).cloned(),
            business_id: event.property(BUSINESS_ID_KEY).cloned(),
        })
        .collect()
}

//! Per-business window queries.
//!
//! Dashboard metrics are recomputed from the raw event log on every call
//! rather than read from the accumulators; that keeps arbitrary time ranges
//! correct at the cost of a full scan, which the in-memory log makes cheap.

use chrono::{DateTime, Duration, Timelike, Utc};
use portico_core::event::{
    Event, PropertyValue, SEARCH_TERM_KEY, SOURCE_KEY, TIME_SPENT_KEY,
};
use portico_core::timeframe::Timeframe;
use serde::Serialize;

use crate::store::{CONTACT_CLICKED, LISTING_VIEWED, SEARCH_PERFORMED};

const TOP_SOURCES_LIMIT: usize = 5;
const SEARCH_KEYWORDS_LIMIT: usize = 10;

/// Traffic source ranked by event count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    /// Source label; `direct` when the event carried none.
    pub source: String,
    /// Events attributed to this source in the window.
    pub count: u64,
}

/// Listing views for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyViews {
    /// Day in `YYYY-MM-DD` form (UTC).
    pub date: String,
    /// `business_listing_viewed` events on that day.
    pub views: u64,
}

/// Event count for one hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourCount {
    /// Hour of day, 0–23 (UTC).
    pub hour: u32,
    /// Events in the window falling in this hour.
    pub count: u64,
}

/// Search keyword ranked by occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    /// Lower-cased search term.
    pub keyword: String,
    /// `search_performed` events carrying this term.
    pub count: u64,
}

/// Aggregated dashboard metrics for one business over one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBundle {
    /// `business_listing_viewed` events in the window.
    pub total_views: u64,
    /// `business_contact_clicked` events in the window.
    pub total_contacts: u64,
    /// Events whose name contains `clicked`.
    pub total_clicks: u64,
    /// Mean `timeSpent` over session events, rounded to the nearest integer.
    pub avg_time_on_page: u64,
    /// Top 5 traffic sources, descending by count.
    pub top_sources: Vec<SourceCount>,
    /// One entry per calendar day of the window, ascending, zero days kept.
    pub daily_views: Vec<DailyViews>,
    /// Exactly 24 entries, hour 0–23, covering all events in the window.
    pub popular_times: Vec<HourCount>,
    /// Top 10 lower-cased search terms, descending by count.
    pub search_keywords: Vec<KeywordCount>,
}

/// Computes the dashboard bundle for `business_id` over `[now - N days, now]`,
/// both bounds inclusive. An unknown business id produces an all-zero bundle.
#[must_use]
pub fn compute(
    events: &[Event],
    business_id: &str,
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> MetricsBundle {
    let start = now - Duration::days(timeframe.days());
    let windowed: Vec<&Event> = events
        .iter()
        .filter(|event| {
            event.business_id() == Some(business_id)
                && event
                    .timestamp()
                    .is_some_and(|ts| ts >= start && ts <= now)
        })
        .collect();

    MetricsBundle {
        total_views: count_named(&windowed, LISTING_VIEWED),
        total_contacts: count_named(&windowed, CONTACT_CLICKED),
        total_clicks: windowed
            .iter()
            .filter(|event| event.name.contains("clicked"))
            .count() as u64,
        avg_time_on_page: average_time_on_page(&windowed),
        top_sources: top_sources(&windowed),
        daily_views: daily_views(&windowed, timeframe, now),
        popular_times: popular_times(&windowed),
        search_keywords: search_keywords(&windowed),
    }
}

fn count_named(events: &[&Event], name: &str) -> u64 {
    events.iter().filter(|event| event.name == name).count() as u64
}

/// Mean of `timeSpent` over events whose name contains `session`; events
/// without the property count as 0. Returns 0 when nothing qualifies.
fn average_time_on_page(events: &[&Event]) -> u64 {
    let sessions: Vec<&&Event> = events
        .iter()
        .filter(|event| event.name.contains("session"))
        .collect();
    if sessions.is_empty() {
        return 0;
    }
    let total: f64 = sessions
        .iter()
        .map(|event| {
            event
                .property(TIME_SPENT_KEY)
                .and_then(PropertyValue::as_f64)
                .unwrap_or(0.0)
        })
        .sum();
    let mean = total / sessions.len() as f64;
    if mean.is_sign_negative() {
        0
    } else {
        mean.round() as u64
    }
}

/// Counts occurrences per key in first-encounter order, then sorts descending
/// by count. The stable sort keeps first-encounter order among ties.
fn ranked_counts(keys: impl Iterator<Item = String>, limit: usize) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

fn top_sources(events: &[&Event]) -> Vec<SourceCount> {
    let keys = events.iter().map(|event| {
        event
            .property(SOURCE_KEY)
            .and_then(PropertyValue::as_str)
            .filter(|source| !source.is_empty())
            .unwrap_or("direct")
            .to_owned()
    });
    ranked_counts(keys, TOP_SOURCES_LIMIT)
        .into_iter()
        .map(|(source, count)| SourceCount { source, count })
        .collect()
}

/// One entry per calendar day for the last N days ending today (UTC),
/// ascending, zero-count days included.
fn daily_views(events: &[&Event], timeframe: Timeframe, now: DateTime<Utc>) -> Vec<DailyViews> {
    (0..timeframe.days())
        .rev()
        .map(|offset| {
            let date = (now - Duration::days(offset)).date_naive();
            let views = events
                .iter()
                .filter(|event| {
                    event.name == LISTING_VIEWED
                        && event.timestamp().is_some_and(|ts| ts.date_naive() == date)
                })
                .count() as u64;
            DailyViews {
                date: date.format("%Y-%m-%d").to_string(),
                views,
            }
        })
        .collect()
}

fn popular_times(events: &[&Event]) -> Vec<HourCount> {
    let mut counts = [0u64; 24];
    for event in events {
        if let Some(ts) = event.timestamp() {
            counts[ts.hour() as usize] += 1;
        }
    }
    counts
        .iter()
        .enumerate()
        .map(|(hour, &count)| HourCount {
            hour: hour as u32,
            count,
        })
        .collect()
}

fn search_keywords(events: &[&Event]) -> Vec<KeywordCount> {
    let keys = events
        .iter()
        .filter(|event| event.name == SEARCH_PERFORMED)
        .filter_map(|event| {
            event
                .property(SEARCH_TERM_KEY)
                .and_then(PropertyValue::as_str)
                .map(str::to_lowercase)
                .filter(|term| !term.is_empty())
        });
    ranked_counts(keys, SEARCH_KEYWORDS_LIMIT)
        .into_iter()
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect()
}

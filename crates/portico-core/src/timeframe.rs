//! Named relative query windows.

use serde::Serialize;

/// A named time window ending at query time.
///
/// Unrecognized inputs resolve to the 30-day default rather than failing;
/// dashboard queries always succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Timeframe {
    /// Last 7 days.
    #[serde(rename = "7d")]
    Days7,
    /// Last 30 days.
    #[serde(rename = "30d")]
    Days30,
    /// Last 90 days.
    #[serde(rename = "90d")]
    Days90,
}

impl Timeframe {
    /// Parses a timeframe string, falling back to 30 days for anything
    /// unrecognized (including `None`).
    #[must_use]
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some("7d") => Self::Days7,
            Some("90d") => Self::Days90,
            _ => Self::Days30,
        }
    }

    /// Window length in days.
    #[must_use]
    pub fn days(self) -> i64 {
        match self {
            Self::Days7 => 7,
            Self::Days30 => 30,
            Self::Days90 => 90,
        }
    }

    /// Canonical string form, echoed back in responses.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Days7 => "7d",
            Self::Days30 => "30d",
            Self::Days90 => "90d",
        }
    }
}

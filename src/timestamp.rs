// 🕰️ Source Timestamps - parsing and formatting of batch date columns
//
// Source extracts are not consistent: some columns carry full timestamps
// with offsets ("2018-03-24T13:56:45.000+05:30"), others plain dates
// ("2020-01-01"). Values keep the precision they arrived with and are
// published back in that same form.

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Pattern of eventHeader.eventDateTime (yyyy-MM-dd'T'HH:mm:ssZ)
pub const EVENT_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// SOURCE TIME
// ============================================================================

/// A source date or timestamp column value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTime {
    /// Plain calendar date, no time or zone
    Date(NaiveDate),
    /// Full timestamp with its original offset
    Timestamp(DateTime<FixedOffset>),
}

impl SourceTime {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();

        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(SourceTime::Timestamp(ts));
        }

        // Spark-style timestamps without the 'T' separator
        if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
            return Ok(SourceTime::Timestamp(ts));
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            return Ok(SourceTime::Date(date));
        }

        Err(anyhow!("Unrecognized date/timestamp value: {:?}", raw))
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            SourceTime::Date(date) => *date,
            SourceTime::Timestamp(ts) => ts.date_naive(),
        }
    }

    pub fn is_date_only(&self) -> bool {
        matches!(self, SourceTime::Date(_))
    }
}

impl fmt::Display for SourceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTime::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            SourceTime::Timestamp(ts) => {
                f.write_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, false))
            }
        }
    }
}

impl FromStr for SourceTime {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        SourceTime::parse(s)
    }
}

impl Serialize for SourceTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SourceTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SourceTime::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Parse a plain source date (load_date columns)
pub fn parse_source_date(raw: &str) -> Result<NaiveDate> {
    SourceTime::parse(raw)
        .map(|value| value.date())
        .map_err(|_| anyhow!("Unrecognized date value: {:?}", raw.trim()))
}

/// Render the processing timestamp carried in event headers
pub fn format_event_date_time(now: DateTime<Utc>) -> String {
    now.format(EVENT_DATE_TIME_FORMAT).to_string()
}

pub fn deserialize_optional_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(value) if !value.trim().is_empty() => parse_source_date(&value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

// ============================================================================
// TESTS
// ============================================================================

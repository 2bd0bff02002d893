use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::utils::time::parse_day;

use super::entities::InsightsData;

/// One calendar day of aggregated activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub total_seconds: f64,
}

/// Seconds of activity per day. Built once per run and read only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivitySeries {
    days: BTreeMap<NaiveDate, f64>,
}

impl ActivitySeries {
    /// Missing days count as zero.
    pub fn seconds(&self, date: NaiveDate) -> f64 {
        self.days.get(&date).copied().unwrap_or(0.)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn nonzero_count(&self) -> usize {
        self.days.values().filter(|v| **v > 0.).count()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.days.values().copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }
}

/// Later records for the same date replace earlier ones.
impl FromIterator<DayRecord> for ActivitySeries {
    fn from_iter<T: IntoIterator<Item = DayRecord>>(iter: T) -> Self {
        let days = iter
            .into_iter()
            .map(|DayRecord { date, total_seconds }| (date, total_seconds))
            .collect();
        Self { days }
    }
}

type Accessor = fn(&Value) -> Option<&Value>;

fn date_field(entry: &Value) -> Option<&Value> {
    entry.get("date")
}

fn range_start(entry: &Value) -> Option<&Value> {
    entry.get("range")?.get("start")
}

fn range_date(entry: &Value) -> Option<&Value> {
    entry.get("range")?.get("date")
}

fn total(entry: &Value) -> Option<&Value> {
    entry.get("total")
}

fn legacy_total_seconds(entry: &Value) -> Option<&Value> {
    entry.get("total_seconds")
}

fn grand_total_seconds(entry: &Value) -> Option<&Value> {
    entry.get("grand_total")?.get("total_seconds")
}

/// Where the day can be found, in priority order.
const DATE_ACCESSORS: [Accessor; 3] = [date_field, range_start, range_date];

/// Where the total can be found, in priority order.
const SECONDS_ACCESSORS: [Accessor; 3] = [total, legacy_total_seconds, grand_total_seconds];

fn as_date(value: &Value) -> Option<NaiveDate> {
    parse_day(value.as_str()?)
}

fn as_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Resolves a single day entry. Entries without a usable date are dropped, a missing total
/// is zero.
pub fn parse_day_entry(entry: &Value) -> Option<DayRecord> {
    let date = DATE_ACCESSORS
        .iter()
        .find_map(|accessor| accessor(entry).and_then(as_date))?;

    let seconds = SECONDS_ACCESSORS
        .iter()
        .find_map(|accessor| accessor(entry).and_then(as_seconds))
        .unwrap_or(0.);

    let total_seconds = if seconds.is_finite() && seconds > 0. {
        seconds
    } else {
        0.
    };

    Some(DayRecord {
        date,
        total_seconds,
    })
}

/// Turns the day entries of a response into an [ActivitySeries], skipping anything malformed.
pub fn parse_days(data: &InsightsData) -> ActivitySeries {
    data.days
        .iter()
        .filter_map(|entry| {
            let record = parse_day_entry(entry);
            if record.is_none() {
                debug!("Skipping day entry without a date {entry}");
            }
            record
        })
        .collect()
}

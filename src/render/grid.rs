use anyhow::{bail, Result};
use chrono::{Datelike, Duration, NaiveDate};

use crate::utils::time::{saturday_on_or_after, sunday_on_or_before};

pub const DAYS_IN_WEEK: usize = 7;

/// Week by weekday layout of the `[start, end]` window, padded to whole Sunday-first weeks.
/// Weeks are columns, weekdays (Sunday = 0) are rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    start: NaiveDate,
    end: NaiveDate,
    weeks: Vec<[NaiveDate; DAYS_IN_WEEK]>,
}

impl CalendarGrid {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("Window start {start} is after its end {end}");
        }
        let first = sunday_on_or_before(start);
        let last = saturday_on_or_after(end);
        let week_count = ((last - first).num_days() as usize + 1) / DAYS_IN_WEEK;

        let weeks = (0..week_count)
            .map(|week| {
                let week_start = first + Duration::weeks(week as i64);
                std::array::from_fn(|day| week_start + Duration::days(day as i64))
            })
            .collect();

        Ok(Self { start, end, weeks })
    }

    /// The Sunday the first column starts on.
    pub fn first_sunday(&self) -> NaiveDate {
        self.weeks[0][0]
    }

    pub fn weeks(&self) -> &[[NaiveDate; DAYS_IN_WEEK]] {
        &self.weeks
    }

    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    pub fn day_count(&self) -> usize {
        self.weeks.len() * DAYS_IN_WEEK
    }

    /// Whether `date` is part of the requested window rather than padding.
    pub fn in_window(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `(column, row)` of a date inside the grid.
    pub fn position(&self, date: NaiveDate) -> Option<(usize, usize)> {
        let offset = (date - self.first_sunday()).num_days();
        if offset < 0 || offset as usize >= self.day_count() {
            return None;
        }
        let offset = offset as usize;
        Some((offset / DAYS_IN_WEEK, offset % DAYS_IN_WEEK))
    }

    /// Columns holding the 1st of a month inside the window, in order.
    pub fn month_starts(&self) -> Vec<(usize, NaiveDate)> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .filter(|d| d.day() == 1)
            .filter_map(|d| self.position(d).map(|(column, _)| (column, d)))
            .collect()
    }
}

#[cfg(test)]
impl CalendarGrid {
    fn last_saturday(&self) -> NaiveDate {
        self.weeks[self.weeks.len() - 1][DAYS_IN_WEEK - 1]
    }
}

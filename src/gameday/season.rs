use std::cmp::{max, min};

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use tracing::debug;

pub const SEASON_START_MONTH: u32 = 4;
pub const SEASON_LAST_MONTH: u32 = 11;

const FIRST_GAMEDAY_SEASON: i32 = 2008;

/// Opening-week listings only become available from this day of April onward.
/// Computed as six minus the weekday of April 1st (Monday = 0), with day 1 used
/// when that comes out to zero.
pub fn first_scrapeable_day(year: i32, month: u32) -> u32 {
    if month != SEASON_START_MONTH {
        return 1;
    }
    NaiveDate::from_ymd_opt(year, month, 1).map_or(1, |first| {
        match 6 - first.weekday().num_days_from_monday() {
            0 => 1,
            d => d,
        }
    })
}

/// Day 1 of the following month, or April 1st of the next year once the season's
/// last month has been reached.
pub fn next_season_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() < SEASON_LAST_MONTH {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year() + 1, SEASON_START_MONTH, 1)
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

/// Off-season dates move forward to the next Opening Day month.
fn into_season(date: NaiveDate) -> Result<NaiveDate> {
    let snapped = match date.month() {
        m if m < SEASON_START_MONTH => NaiveDate::from_ymd_opt(date.year(), SEASON_START_MONTH, 1),
        m if m > SEASON_LAST_MONTH => {
            NaiveDate::from_ymd_opt(date.year() + 1, SEASON_START_MONTH, 1)
        }
        _ => Some(date),
    };
    snapped.with_context(|| format!("No season date follows {date}"))
}

/// Lazily yields every calendar day to crawl between two dates, month by month,
/// skipping the off-season.
#[derive(Debug, Clone)]
pub struct SeasonDays {
    next_day: Option<NaiveDate>,
    month_last: NaiveDate,
    end: NaiveDate,
}

impl SeasonDays {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            bail!("Crawl end date {} is before start date {}", end, start);
        }
        let cursor = into_season(start)?;
        let mut days = Self {
            next_day: None,
            month_last: cursor,
            end,
        };
        days.enter_month(cursor);
        Ok(days)
    }

    fn enter_month(&mut self, cursor: NaiveDate) {
        if cursor > self.end {
            self.next_day = None;
            return;
        }
        let first_day = max(
            cursor.day(),
            first_scrapeable_day(cursor.year(), cursor.month()),
        );
        self.next_day = cursor.with_day(first_day);
        self.month_last = min(last_day_of_month(cursor), self.end);
        debug!(
            "Month {}-{:02}: days {} through {}",
            cursor.year(),
            cursor.month(),
            first_day,
            self.month_last.day()
        );
    }
}

impl Iterator for SeasonDays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let day = self.next_day?;
            if day <= self.month_last {
                self.next_day = day.succ_opt();
                return Some(day);
            }
            match next_season_month(self.month_last) {
                Some(next_month) => self.enter_month(next_month),
                None => self.next_day = None,
            }
        }
    }
}

/// The outer limits of any crawl: the first season Gameday published, the end
/// of the current season, and today.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SeasonBounds {
    pub season_start: NaiveDate,
    pub season_end: NaiveDate,
    pub today: NaiveDate,
}

impl SeasonBounds {
    pub fn new(season_start: Option<NaiveDate>, today: NaiveDate) -> Result<Self> {
        let season_start = match season_start {
            Some(d) => d,
            None => NaiveDate::from_ymd_opt(FIRST_GAMEDAY_SEASON, SEASON_START_MONTH, 1)
                .context("Invalid default season start")?,
        };
        let season_end = NaiveDate::from_ymd_opt(today.year(), SEASON_LAST_MONTH, 1)
            .context("Invalid default season end")?;
        Ok(Self {
            season_start,
            season_end,
            today,
        })
    }

    /// Resolves optional explicit dates against the season bounds. The end date
    /// never runs past the season end or today.
    pub fn crawl_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<SeasonDays> {
        let start = start.unwrap_or(self.season_start);
        let end = end.unwrap_or(self.season_end).min(self.season_end).min(self.today);
        SeasonDays::new(start, end)
            .with_context(|| format!("Invalid crawl range {start} to {end}"))
    }
}

//! Monthly roll timing.
//!
//! The host fires a month-start event on the first trading day of each month
//! and a week-end event on the last trading day of each week. [`CycleCounter`]
//! turns that stream into one roll per month.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use put_overlay_core::config::RollSchedule;

/// Week-end events seen since the last month start.
#[derive(Debug, Clone)]
pub struct CycleCounter {
    schedule: RollSchedule,
    roll_week: u32,
    count: u32,
    /// (year, month) of the last roll under [`RollSchedule::ThirdFridayWeek`].
    rolled_month: Option<(i32, u32)>,
}

impl CycleCounter {
    #[must_use]
    pub const fn new(schedule: RollSchedule, roll_week: u32) -> Self {
        Self {
            schedule,
            roll_week,
            count: 0,
            rolled_month: None,
        }
    }

    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Registers a week-end event and reports whether it is the roll week.
    pub fn advance(&mut self, date: NaiveDate) -> bool {
        self.count += 1;

        match self.schedule {
            RollSchedule::WeekEndCount => self.count == self.roll_week,
            RollSchedule::ThirdFridayWeek => {
                // A holiday can pull the event back into the previous month,
                // so the week belongs to the month of its Friday.
                let friday = week_friday(date);
                let month = (friday.year(), friday.month());
                if self.rolled_month == Some(month) || !self.is_roll_friday(friday) {
                    return false;
                }
                self.rolled_month = Some(month);
                true
            }
        }
    }

    fn is_roll_friday(&self, friday: NaiveDate) -> bool {
        let Ok(n) = u8::try_from(self.roll_week) else {
            return false;
        };
        nth_friday(friday.year(), friday.month(), n) == Some(friday)
    }
}

/// Friday of the Monday-based week containing `date`.
fn week_friday(date: NaiveDate) -> NaiveDate {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    monday + Duration::days(4)
}

/// The `n`-th Friday of a month, if the month has one.
#[must_use]
pub fn nth_friday(year: i32, month: u32, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Fri, n)
}

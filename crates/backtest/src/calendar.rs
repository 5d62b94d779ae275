use chrono::{Datelike, NaiveDate, Weekday};
use put_overlay_core::events::ScheduledEvent;

/// Derives month-start and week-end events from a sorted list of trading
/// dates.
///
/// A month starts on its first trading date. A week (Monday to Sunday) ends
/// on its last trading date. The final week in the data only ends if its last
/// date is a Friday, since later trading days in that week are unknown. On a
/// date carrying both events the month start comes first.
#[must_use]
pub fn schedule_events(dates: &[NaiveDate]) -> Vec<ScheduledEvent> {
    let mut events = Vec::new();

    for (i, &date) in dates.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| dates[p]);
        let next = dates.get(i + 1).copied();

        let month_start = prev.map_or(true, |p| (p.year(), p.month()) != (date.year(), date.month()));
        if month_start {
            events.push(ScheduledEvent::MonthStart { date });
        }

        let week_end = match next {
            Some(n) => n.iso_week() != date.iso_week(),
            None => date.weekday() == Weekday::Fri,
        };
        if week_end {
            events.push(ScheduledEvent::WeekEnd { date });
        }
    }

    events
}

//! Wall-clock abstraction and the week policy.
//!
//! Week numbering follows the strftime `%W` rule: Monday is the first day
//! of the week, and all days in a new year preceding the year's first
//! Monday fall in week 0. Week numbers are year-relative only —
//! `is_current_week` compares bare week numbers, so they are NOT
//! continuous across a year boundary. Known limitation, kept on purpose.

use chrono::{DateTime, Datelike, Utc};
use std::sync::Mutex;

/// Time source for the registry. Production code uses `SystemClock`;
/// tests substitute `ManualClock` to drive week rollover.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock. Every handle sharing it observes `set()` immediately.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock lock poisoned") = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}

/// Week of the year for `t`, Monday-first, in `[0, 53]`.
pub fn week_number(t: DateTime<Utc>) -> u32 {
    let days_from_monday = t.weekday().num_days_from_monday();
    (t.ordinal0() + 7 - days_from_monday) / 7
}

/// Whether `t` falls in the same week as the clock's "now".
pub fn is_current_week(clock: &dyn Clock, t: DateTime<Utc>) -> bool {
    week_number(t) == week_number(clock.now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn year_starting_on_monday_opens_week_one() {
        // 2024-01-01 was a Monday: no week-0 days that year.
        assert_eq!(week_number(day(2024, 1, 1)), 1);
        assert_eq!(week_number(day(2024, 1, 7)), 1);
        assert_eq!(week_number(day(2024, 1, 8)), 2);
    }

    #[test]
    fn days_before_first_monday_are_week_zero() {
        // 2025-01-01 was a Wednesday; the first Monday is Jan 6.
        assert_eq!(week_number(day(2025, 1, 1)), 0);
        assert_eq!(week_number(day(2025, 1, 5)), 0);
        assert_eq!(week_number(day(2025, 1, 6)), 1);
    }

    #[test]
    fn week_runs_monday_through_sunday() {
        let monday = day(2025, 8, 25);
        let friday = day(2025, 8, 29);
        let sunday_before = day(2025, 8, 24);

        assert_eq!(week_number(monday), week_number(friday));
        assert_ne!(week_number(monday), week_number(sunday_before));
    }

    #[test]
    fn manual_clock_drives_the_current_week_predicate() {
        let clock = ManualClock::new(day(2025, 8, 25));
        let friday = day(2025, 8, 29);

        assert!(is_current_week(&clock, friday));

        clock.set(day(2025, 9, 1));
        assert!(!is_current_week(&clock, friday));
    }
}

//! Store hours, open/closed status, and pickup time rules.
//!
//! All times are shop-local wall clock times. Callers pass `now` explicitly so
//! pages and tests agree on a single instant.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use thiserror::Error;

/// Pickups must be scheduled at least this long before closing.
pub const PICKUP_CUTOFF_MINUTES: i64 = 30;

/// Spacing between offered pickup slots.
pub const SLOT_MINUTES: i64 = 30;

/// How far ahead a pickup may be booked.
pub const BOOKING_WINDOW_DAYS: i64 = 30;

/// One-line summary of the weekly hours shown on the checkout page.
pub const WEEKLY_SUMMARY: &str =
    "Mon-Thu: 10:00 AM - 8:00 PM • Fri-Sat: 10:00 AM - 9:00 PM • Sun: 11:00 AM - 6:00 PM";

/// Opening hours for a single day, as minutes after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    open: u32,
    close: u32,
}

impl DayHours {
    const fn new(open_hour: u32, close_hour: u32) -> Self {
        Self {
            open: open_hour * 60,
            close: close_hour * 60,
        }
    }

    fn at(minutes: u32) -> NaiveTime {
        NaiveTime::MIN + Duration::minutes(i64::from(minutes))
    }

    #[must_use]
    pub fn opens_at(self) -> NaiveTime {
        Self::at(self.open)
    }

    #[must_use]
    pub fn closes_at(self) -> NaiveTime {
        Self::at(self.close)
    }

    /// Latest time a pickup may be scheduled.
    #[must_use]
    pub fn last_pickup(self) -> NaiveTime {
        self.closes_at() - Duration::minutes(PICKUP_CUTOFF_MINUTES)
    }
}

/// The shop's weekly schedule. `None` marks a closed day.
#[must_use]
pub const fn hours_for(day: Weekday) -> Option<DayHours> {
    match day {
        Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => Some(DayHours::new(10, 20)),
        Weekday::Fri | Weekday::Sat => Some(DayHours::new(10, 21)),
        Weekday::Sun => Some(DayHours::new(11, 18)),
    }
}

/// Full English weekday name.
#[must_use]
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// 12-hour clock, e.g. `3:30 PM` or `12:00 AM`.
#[must_use]
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Drop seconds so comparisons work at `HH:MM` resolution.
fn to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// Whether the shop is open. Both the opening and the closing minute count.
#[must_use]
pub fn is_open(now: NaiveDateTime) -> bool {
    let time = to_minute(now.time());
    hours_for(now.weekday()).is_some_and(|h| time >= h.opens_at() && time <= h.closes_at())
}

/// Open or closed, with the times shoppers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    Open {
        closes_at: NaiveTime,
        pickup_until: NaiveTime,
    },
    Closed {
        /// Next opening within a week, if any.
        next_open: Option<(NaiveDate, NaiveTime)>,
    },
}

impl StoreStatus {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// `open` or `closed`, as recorded on orders.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        if self.is_open() { "open" } else { "closed" }
    }

    /// Status line for the header and checkout page.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Open { closes_at, .. } => {
                format!("Store is OPEN • Closes at {} today", format_clock(*closes_at))
            }
            Self::Closed {
                next_open: Some((date, opens_at)),
            } => format!(
                "Store is CLOSED • Opens {} at {}",
                date.format("%A, %b %-d"),
                format_clock(*opens_at)
            ),
            Self::Closed { next_open: None } => "Store is currently closed".to_string(),
        }
    }
}

/// Current store status.
///
/// When closed, the next opening is searched from tomorrow onward.
#[must_use]
pub fn status(now: NaiveDateTime) -> StoreStatus {
    if is_open(now) {
        if let Some(hours) = hours_for(now.weekday()) {
            return StoreStatus::Open {
                closes_at: hours.closes_at(),
                pickup_until: hours.last_pickup(),
            };
        }
    }

    let today = now.date();
    let next_open = (1..=7)
        .map(|offset| today + Duration::days(offset))
        .find_map(|date| hours_for(date.weekday()).map(|h| (date, h.opens_at())));

    StoreStatus::Closed { next_open }
}

/// Why a pickup time was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickupError {
    #[error("Store is closed on {day}")]
    ClosedOn { day: &'static str },

    #[error("Store hours on {day}: {opens} - {closes}")]
    OutsideHours {
        day: &'static str,
        opens: String,
        closes: String,
    },

    #[error("Pickup must be at least 30 minutes before closing ({closes})")]
    TooCloseToClosing { closes: String },

    #[error("Cannot select a date/time in the past")]
    InPast,
}

/// Check a requested pickup against the schedule.
///
/// # Errors
///
/// Returns the first failed rule, checked in order: the shop is open that
/// day, the time falls within its hours, the time leaves the pickup cutoff
/// before closing, and the moment is not in the past.
pub fn validate_pickup(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> Result<(), PickupError> {
    let day = weekday_name(date.weekday());
    let hours = hours_for(date.weekday()).ok_or(PickupError::ClosedOn { day })?;

    let time = to_minute(time);
    if time < hours.opens_at() || time > hours.closes_at() {
        return Err(PickupError::OutsideHours {
            day,
            opens: format_clock(hours.opens_at()),
            closes: format_clock(hours.closes_at()),
        });
    }

    if time > hours.last_pickup() {
        return Err(PickupError::TooCloseToClosing {
            closes: format_clock(hours.closes_at()),
        });
    }

    if date.and_time(time) < now {
        return Err(PickupError::InPast);
    }

    Ok(())
}

/// A pickup time offered for a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupSlot {
    pub time: NaiveTime,
    /// Already past for today's date.
    pub available: bool,
}

impl PickupSlot {
    /// Form value, `HH:MM`.
    #[must_use]
    pub fn value(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    #[must_use]
    pub fn label(&self) -> String {
        let clock = format_clock(self.time);
        if self.available {
            clock
        } else {
            format!("{clock} (Past)")
        }
    }
}

/// Slots every half hour from opening until the pickup cutoff.
///
/// Returns an empty list on closed days.
#[must_use]
pub fn pickup_slots(date: NaiveDate, now: NaiveDateTime) -> Vec<PickupSlot> {
    let Some(hours) = hours_for(date.weekday()) else {
        return Vec::new();
    };

    let last = hours.last_pickup();
    let mut slots = Vec::new();
    let mut time = hours.opens_at();
    while time <= last {
        slots.push(PickupSlot {
            time,
            available: date.and_time(time) >= now,
        });
        let next = time + Duration::minutes(SLOT_MINUTES);
        if next <= time {
            break;
        }
        time = next;
    }
    slots
}

/// Dates a pickup may be booked for: today through the booking window.
#[must_use]
pub fn pickup_window(now: NaiveDateTime) -> (NaiveDate, NaiveDate) {
    let today = now.date();
    (today, today + Duration::days(BOOKING_WINDOW_DAYS))
}

/// First slot strictly after `now`, searching from today through the window.
#[must_use]
pub fn default_pickup(now: NaiveDateTime) -> Option<(NaiveDate, NaiveTime)> {
    let (first, last) = pickup_window(now);
    first
        .iter_days()
        .take_while(|date| *date <= last)
        .find_map(|date| {
            pickup_slots(date, now)
                .into_iter()
                .find(|slot| date.and_time(slot.time) > now)
                .map(|slot| (date, slot.time))
        })
}

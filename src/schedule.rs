//! Schedules
//!
//! Clock times, weekday sets and the weekly day/time window predicate shared by
//! time-slot rules, checkout promotion resolution and the flash feed.

use std::fmt;

use jiff::civil::{Time, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

/// Day names indexed Sunday = 0.
const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Parse `H:MM`, `HH:MM` or `HH:MM:SS` into a clock time.
///
/// Returns `None` for anything else, including out-of-range components.
pub fn parse_clock(raw: &str) -> Option<Time> {
    let mut parts = raw.trim().split(':');

    let hour = parse_component(parts.next()?, 1..=2)?;
    let minute = parse_component(parts.next()?, 2..=2)?;
    let second = match parts.next() {
        Some(second) => parse_component(second, 2..=2)?,
        None => 0,
    };

    if parts.next().is_some() {
        return None;
    }

    Time::new(hour, minute, second, 0).ok()
}

fn parse_component(raw: &str, width: std::ops::RangeInclusive<usize>) -> Option<i8> {
    if !width.contains(&raw.len()) || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    raw.parse().ok()
}

/// Minutes since midnight, seconds dropped.
pub fn minutes_since_midnight(time: Time) -> i32 {
    i32::from(time.hour()) * 60 + i32::from(time.minute())
}

/// Zero-based weekday index with Sunday = 0.
pub fn day_index(weekday: Weekday) -> u8 {
    u8::try_from(weekday.to_sunday_zero_offset()).unwrap_or_default()
}

/// A set of weekdays.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DaySet(u8);

impl DaySet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build a set from Sunday-zero day indexes. Indexes above 6 are ignored.
    pub fn from_indices(indices: impl IntoIterator<Item = u8>) -> Self {
        indices
            .into_iter()
            .filter(|index| *index < 7)
            .fold(Self::empty(), |set, index| Self(set.0 | (1 << index)))
    }

    /// Whether the weekday is in the set.
    pub fn contains(self, weekday: Weekday) -> bool {
        self.0 & (1 << day_index(weekday)) != 0
    }

    /// Whether no day is selected.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Selected day indexes in ascending order.
    pub fn indices(self) -> SmallVec<[u8; 7]> {
        (0..7).filter(|index| self.0 & (1 << index) != 0).collect()
    }

    /// Human readable day list, e.g. `"Monday, Wednesday"`.
    pub fn describe(self) -> String {
        self.indices()
            .iter()
            .filter_map(|index| DAY_NAMES.get(usize::from(*index)).copied())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Debug for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.indices()).finish()
    }
}

impl Serialize for DaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.indices().as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<u8>::deserialize(deserializer).map(Self::from_indices)
    }
}

/// A weekly recurring window: a set of days and an inclusive time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyWindow {
    /// Days the window is open.
    pub days: DaySet,

    /// Opening time, inclusive.
    pub start: Time,

    /// Closing time, inclusive.
    pub end: Time,
}

impl WeeklyWindow {
    /// Create a window.
    pub fn new(days: DaySet, start: Time, end: Time) -> Self {
        Self { days, start, end }
    }

    /// Whether `time` on `weekday` falls inside the window, at minute precision.
    pub fn contains_minute(&self, weekday: Weekday, time: Time) -> bool {
        if !self.days.contains(weekday) {
            return false;
        }

        let minute = minutes_since_midnight(time);

        minutes_since_midnight(self.start) <= minute && minute <= minutes_since_midnight(self.end)
    }

    /// Last instant of the closing minute, when the window actually shuts.
    pub fn closes_at(&self) -> Time {
        Time::new(self.end.hour(), self.end.minute(), 59, 999_999_999).unwrap_or(self.end)
    }

    /// Window opening and closing times as `HH:MM`.
    pub fn time_range(&self) -> (String, String) {
        (format_clock(self.start), format_clock(self.end))
    }
}

/// Format a time as `HH:MM`.
pub fn format_clock(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

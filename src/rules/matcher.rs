//! Rule Matcher
//!
//! Decides whether a rule's conditions hold for a booking. Missing or malformed
//! conditions never match.

use jiff::civil::{Date, Time};
use tracing::{debug, warn};

use crate::rules::{PricingRule, RuleKind};

/// The booking parameters rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingContext {
    /// Party size.
    pub participants: u32,

    /// Booking date, if chosen yet.
    pub date: Option<Date>,

    /// Booking time, if chosen yet.
    pub time: Option<Time>,
}

impl BookingContext {
    /// Context with only a party size.
    pub fn new(participants: u32) -> Self {
        Self {
            participants,
            date: None,
            time: None,
        }
    }

    /// Set the booking date.
    #[must_use]
    pub fn on(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the booking time.
    #[must_use]
    pub fn at(mut self, time: Time) -> Self {
        self.time = Some(time);
        self
    }
}

impl RuleKind {
    /// Evaluate the conditions against a booking.
    pub fn matches(&self, context: &BookingContext) -> bool {
        match self {
            RuleKind::ParticipantTiers { min, max } => {
                (*min..=*max).contains(&context.participants)
            }
            RuleKind::TimeSlots { start, end } => match (start, end, context.time) {
                (Some(start), Some(end), Some(time)) => *start <= time && time <= *end,
                _ => false,
            },
            RuleKind::DayOfWeek { days } => match (days, context.date) {
                (Some(days), Some(date)) => days.contains(date.weekday()),
                _ => false,
            },
            RuleKind::DurationMultiplier | RuleKind::Seasonal => {
                debug!(
                    rule_type = self.type_name(),
                    "reserved rule type is not evaluated"
                );

                false
            }
            RuleKind::Malformed { rule_type } => {
                warn!(rule_type = %rule_type, "rule with malformed conditions never applies");

                false
            }
            RuleKind::Unknown(name) => {
                warn!(rule_type = %name, "unknown rule type never applies");

                false
            }
        }
    }
}

impl PricingRule {
    /// Whether this rule's conditions hold for the booking.
    pub fn matches(&self, context: &BookingContext) -> bool {
        self.kind.matches(context)
    }
}

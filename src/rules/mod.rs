//! Pricing Rules
//!
//! Conditional price modifiers configured by a business, either for a single
//! offer or for every offer it sells.

use std::cmp::Reverse;

use jiff::civil::Time;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::{
    schedule::{DaySet, parse_clock},
    uuids::{BusinessUuid, OfferUuid, RuleUuid},
};

pub mod matcher;

pub use matcher::BookingContext;

/// Lower participant bound when a tier omits it.
pub const DEFAULT_MIN_PARTICIPANTS: u32 = 0;

/// Upper participant bound when a tier omits it.
pub const DEFAULT_MAX_PARTICIPANTS: u32 = 999;

/// What a rule conditions on, with its parsed conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Party size within an inclusive range.
    ParticipantTiers {
        /// Minimum participants, inclusive.
        min: u32,

        /// Maximum participants, inclusive.
        max: u32,
    },

    /// Booking time within an inclusive clock range.
    ///
    /// A bound is `None` when it was missing or unparsable.
    TimeSlots {
        /// Slot start.
        start: Option<Time>,

        /// Slot end.
        end: Option<Time>,
    },

    /// Booking weekday within a set of days.
    DayOfWeek {
        /// Configured days, `None` when missing.
        days: Option<DaySet>,
    },

    /// Reserved, never evaluated.
    DurationMultiplier,

    /// Reserved, never evaluated.
    Seasonal,

    /// A known rule type whose condition payload could not be read.
    Malformed {
        /// Stored type name.
        rule_type: String,
    },

    /// A rule type this engine does not know.
    Unknown(String),
}

impl RuleKind {
    /// Build a rule kind from its stored type name and condition payload.
    pub fn from_parts(rule_type: &str, conditions: &RuleConditions) -> Self {
        match rule_type {
            "participant_tiers" => RuleKind::ParticipantTiers {
                min: conditions
                    .min_participants
                    .unwrap_or(DEFAULT_MIN_PARTICIPANTS),
                max: conditions
                    .max_participants
                    .unwrap_or(DEFAULT_MAX_PARTICIPANTS),
            },
            "time_slots" => RuleKind::TimeSlots {
                start: conditions.start_time.as_deref().and_then(parse_clock),
                end: conditions.end_time.as_deref().and_then(parse_clock),
            },
            "day_of_week" => RuleKind::DayOfWeek {
                days: conditions
                    .days
                    .as_ref()
                    .map(|days| DaySet::from_indices(days.iter().copied())),
            },
            "duration_multiplier" => RuleKind::DurationMultiplier,
            "seasonal" => RuleKind::Seasonal,
            other => RuleKind::Unknown(other.to_string()),
        }
    }

    /// Stored type name.
    pub fn type_name(&self) -> &str {
        match self {
            RuleKind::ParticipantTiers { .. } => "participant_tiers",
            RuleKind::TimeSlots { .. } => "time_slots",
            RuleKind::DayOfWeek { .. } => "day_of_week",
            RuleKind::DurationMultiplier => "duration_multiplier",
            RuleKind::Seasonal => "seasonal",
            RuleKind::Malformed { rule_type } | RuleKind::Unknown(rule_type) => rule_type,
        }
    }
}

/// Condition payload as stored alongside a rule.
///
/// Each rule type reads the fields it cares about and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuleConditions {
    /// Tier lower bound.
    pub min_participants: Option<u32>,

    /// Tier upper bound.
    pub max_participants: Option<u32>,

    /// Slot start, `HH:MM[:SS]`.
    pub start_time: Option<String>,

    /// Slot end, `HH:MM[:SS]`.
    pub end_time: Option<String>,

    /// Sunday-zero weekday indexes.
    pub days: Option<Vec<u8>>,
}

impl RuleConditions {
    /// Read a stored payload. An absent payload has no conditions.
    ///
    /// # Errors
    ///
    /// Returns an error when a field has the wrong shape, such as a
    /// negative tier bound or a day list given as a string.
    pub fn from_value(value: serde_norway::Value) -> Result<Self, serde_norway::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }

        serde_norway::from_value(value)
    }
}

/// A pricing rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRule {
    /// Rule identifier.
    pub uuid: RuleUuid,

    /// Owning business.
    pub business: BusinessUuid,

    /// Offer the rule is scoped to, `None` for every offer of the business.
    pub offer: Option<OfferUuid>,

    /// Display name, used as the breakdown label.
    pub name: String,

    /// Rule type and conditions.
    pub kind: RuleKind,

    /// Signed modifier, a percentage or an absolute amount.
    pub price_modifier: Decimal,

    /// Whether `price_modifier` is a percentage.
    pub is_percentage: bool,

    /// Inactive rules are never applied.
    pub is_active: bool,

    /// Higher priorities are applied first.
    pub priority: i32,
}

impl PricingRule {
    /// Whether this rule is active and scoped to `offer` (directly or business-wide).
    pub fn applies_to_offer(&self, offer: OfferUuid) -> bool {
        self.is_active && self.offer.is_none_or(|scoped| scoped == offer)
    }
}

/// A pricing rule as read from storage.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingRuleRecord {
    /// Rule identifier.
    #[serde(default)]
    pub uuid: RuleUuid,

    /// Owning business.
    pub business: BusinessUuid,

    /// Optional offer scope.
    #[serde(default)]
    pub offer: Option<OfferUuid>,

    /// Display name.
    #[serde(alias = "rule_name")]
    pub name: String,

    /// Stored type name.
    pub rule_type: String,

    /// Condition payload, read when the rule is built.
    #[serde(default)]
    pub conditions: serde_norway::Value,

    /// Signed modifier.
    pub price_modifier: Decimal,

    /// Percentage or absolute modifier.
    #[serde(default)]
    pub is_percentage: bool,

    /// Active flag.
    #[serde(default = "active_by_default")]
    pub is_active: bool,

    /// Application priority.
    #[serde(default)]
    pub priority: i32,
}

fn active_by_default() -> bool {
    true
}

impl From<PricingRuleRecord> for PricingRule {
    fn from(record: PricingRuleRecord) -> Self {
        let kind = match RuleConditions::from_value(record.conditions) {
            Ok(conditions) => RuleKind::from_parts(&record.rule_type, &conditions),
            Err(err) => {
                warn!(
                    rule = %record.name,
                    rule_type = %record.rule_type,
                    error = %err,
                    "malformed rule conditions"
                );

                RuleKind::Malformed {
                    rule_type: record.rule_type,
                }
            }
        };

        Self {
            uuid: record.uuid,
            business: record.business,
            offer: record.offer,
            name: record.name,
            kind,
            price_modifier: record.price_modifier,
            is_percentage: record.is_percentage,
            is_active: record.is_active,
            priority: record.priority,
        }
    }
}

/// Sort rules by descending priority, keeping fetch order between equal priorities.
pub fn sort_by_priority(rules: &mut [PricingRule]) {
    rules.sort_by_key(|rule| Reverse(rule.priority));
}

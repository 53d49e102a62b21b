//! Promotions
//!
//! Recurring weekly promotions and fixed-window (flash) promotions attached to
//! an offer.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    schedule::{DaySet, WeeklyWindow, parse_clock},
    uuids::{OfferUuid, PromotionUuid},
};

pub mod eligibility;
pub mod flash;

pub use eligibility::{
    EligiblePromotion, PromotionEligibility, PromotionResolver, PromotionType, ScheduleInfo,
};
pub use flash::{FlashFeed, FlashOffer};

/// Errors converting stored promotion data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromotionDataError {
    /// A window bound is not a valid clock time.
    #[error("invalid clock time {0:?} on promotion {1}")]
    InvalidTime(String, PromotionUuid),
}

/// A discount repeating on a weekly day/time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringPromotion {
    /// Promotion identifier.
    pub uuid: PromotionUuid,

    /// Discounted offer.
    pub offer: OfferUuid,

    /// Display title.
    pub title: String,

    /// When the promotion runs.
    pub window: WeeklyWindow,

    /// Percentage taken off.
    pub discount_percentage: Decimal,

    /// Inactive promotions never match.
    pub is_active: bool,
}

/// A recurring promotion as read from storage.
#[derive(Debug, Clone, Deserialize)]
pub struct RecurringPromotionRecord {
    /// Promotion identifier.
    #[serde(default)]
    pub uuid: PromotionUuid,

    /// Discounted offer.
    pub offer: OfferUuid,

    /// Display title.
    #[serde(default)]
    pub title: String,

    /// Sunday-zero weekday indexes.
    pub days_of_week: DaySet,

    /// Window start, `HH:MM`.
    pub start_time: String,

    /// Window end, `HH:MM`.
    pub end_time: String,

    /// Percentage taken off.
    pub discount_percentage: Decimal,

    /// Active flag.
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

impl TryFrom<RecurringPromotionRecord> for RecurringPromotion {
    type Error = PromotionDataError;

    fn try_from(record: RecurringPromotionRecord) -> Result<Self, Self::Error> {
        let uuid = record.uuid;
        let clock = |raw: &str| {
            parse_clock(raw).ok_or_else(|| PromotionDataError::InvalidTime(raw.to_string(), uuid))
        };

        let window = WeeklyWindow::new(
            record.days_of_week,
            clock(&record.start_time)?,
            clock(&record.end_time)?,
        );

        Ok(Self {
            uuid: record.uuid,
            offer: record.offer,
            title: record.title,
            window,
            discount_percentage: record.discount_percentage,
            is_active: record.is_active,
        })
    }
}

/// How a fixed promotion discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `discount_value` percent off.
    Percentage,

    /// `discount_value` off in currency units.
    FixedAmount,

    /// An item thrown in for free.
    FreeItem,

    /// Buy some, get some free.
    BuyXGetY,
}

/// A discount running between two instants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixedPromotion {
    /// Promotion identifier.
    #[serde(default)]
    pub uuid: PromotionUuid,

    /// Discounted offer.
    pub offer: OfferUuid,

    /// Display title.
    #[serde(default)]
    pub title: String,

    /// Discount type.
    #[serde(rename = "discount_type")]
    pub discount_kind: DiscountKind,

    /// Discount amount, read according to `discount_kind`.
    pub discount_value: Decimal,

    /// Advertised price before the promotion.
    pub original_price: Decimal,

    /// Advertised price during the promotion.
    pub promotional_price: Decimal,

    /// Start instant, inclusive.
    #[serde(rename = "start_date")]
    pub starts_at: Timestamp,

    /// End instant, inclusive.
    #[serde(rename = "end_date")]
    pub ends_at: Timestamp,

    /// Inactive promotions never match.
    #[serde(default = "active_by_default")]
    pub is_active: bool,

    /// Cap on party size, if any.
    #[serde(default)]
    pub max_participants: Option<u32>,
}

impl FixedPromotion {
    /// The discount as a percentage, when it is expressed as one.
    ///
    /// Other discount types aren't translated and report zero.
    pub fn percentage(&self) -> Decimal {
        match self.discount_kind {
            DiscountKind::Percentage => self.discount_value,
            DiscountKind::FixedAmount | DiscountKind::FreeItem | DiscountKind::BuyXGetY => {
                Decimal::ZERO
            }
        }
    }
}

/// Every promotion attached to an offer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionSet {
    /// Weekly promotions.
    pub recurring: Vec<RecurringPromotion>,

    /// Fixed-window promotions.
    pub fixed: Vec<FixedPromotion>,
}

impl PromotionSet {
    /// Whether there is nothing to resolve.
    pub fn is_empty(&self) -> bool {
        self.recurring.is_empty() && self.fixed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{Weekday, time};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn recurring_record_parses_window() -> TestResult {
        let yaml = r#"
offer: 5a1d7c9e-3b2f-4e6a-8d0c-1f2e3d4c5b6a
title: Afterwork
days_of_week: [1, 3]
start_time: "18:00"
end_time: "20:00"
discount_percentage: 15
"#;

        let record: RecurringPromotionRecord = serde_norway::from_str(yaml)?;
        let promotion = RecurringPromotion::try_from(record)?;

        assert!(promotion.is_active);
        assert_eq!(promotion.window.start, time(18, 0, 0, 0));
        assert!(promotion.window.days.contains(Weekday::Wednesday));
        assert_eq!(promotion.discount_percentage, Decimal::from(15));

        Ok(())
    }

    #[test]
    fn recurring_record_rejects_bad_time() -> TestResult {
        let yaml = r#"
offer: 5a1d7c9e-3b2f-4e6a-8d0c-1f2e3d4c5b6a
days_of_week: [1]
start_time: "late"
end_time: "20:00"
discount_percentage: 15
"#;

        let record: RecurringPromotionRecord = serde_norway::from_str(yaml)?;

        assert!(matches!(
            RecurringPromotion::try_from(record),
            Err(PromotionDataError::InvalidTime(raw, _)) if raw == "late"
        ));

        Ok(())
    }

    #[test]
    fn fixed_promotion_deserializes_storage_names() -> TestResult {
        let yaml = r"
offer: 5a1d7c9e-3b2f-4e6a-8d0c-1f2e3d4c5b6a
title: Flash karting
discount_type: fixed_amount
discount_value: 5
original_price: 25
promotional_price: 20
start_date: 2026-10-20T00:00:00Z
end_date: 2026-10-22T23:59:59Z
max_participants: 8
";

        let promotion: FixedPromotion = serde_norway::from_str(yaml)?;

        assert_eq!(promotion.discount_kind, DiscountKind::FixedAmount);
        assert_eq!(promotion.max_participants, Some(8));
        assert_eq!(promotion.percentage(), Decimal::ZERO);

        Ok(())
    }
}

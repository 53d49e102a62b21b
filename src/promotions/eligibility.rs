//! Promotion Eligibility
//!
//! Resolves which promotion, if any, covers a booking. Recurring promotions are
//! checked before fixed ones and the first match wins.

use jiff::{
    civil::{Date, Time},
    tz::TimeZone,
};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::{
    money::apply_percent,
    promotions::{DiscountKind, FixedPromotion, PromotionSet, RecurringPromotion},
    uuids::{OfferUuid, PromotionUuid},
};

/// Which kind of promotion matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionType {
    /// A weekly recurring promotion.
    Recurring,

    /// A fixed-window promotion.
    Regular,
}

/// When the matched promotion runs, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleInfo {
    /// Weekly window.
    Weekly {
        /// Day list, e.g. `"Monday, Wednesday"`.
        days: String,

        /// `HH:MM`
        start_time: String,

        /// `HH:MM`
        end_time: String,
    },

    /// Calendar date range.
    DateRange {
        /// First day, inclusive.
        starts_on: Date,

        /// Last day, inclusive.
        ends_on: Date,
    },
}

/// The promotion covering a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligiblePromotion {
    /// Promotion identifier.
    pub uuid: PromotionUuid,

    /// Display title.
    pub title: String,

    /// Recurring or regular.
    pub promotion_type: PromotionType,

    /// Percentage taken off; zero for discounts not expressed as a percentage.
    pub discount_percentage: Decimal,

    /// When it runs.
    pub schedule: ScheduleInfo,
}

/// Outcome of promotion resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionEligibility {
    /// The matched promotion, `None` when nothing covers the booking.
    pub promotion: Option<EligiblePromotion>,
}

impl PromotionEligibility {
    /// Nothing matched.
    pub fn not_eligible() -> Self {
        Self::default()
    }

    /// Whether a promotion matched.
    pub fn is_eligible(&self) -> bool {
        self.promotion.is_some()
    }

    /// Percentage off, zero when nothing matched.
    pub fn discount_percentage(&self) -> Decimal {
        self.promotion
            .as_ref()
            .map_or(Decimal::ZERO, |promotion| promotion.discount_percentage)
    }

    /// Matched promotion kind.
    pub fn promotion_type(&self) -> Option<PromotionType> {
        self.promotion
            .as_ref()
            .map(|promotion| promotion.promotion_type)
    }

    /// Matched promotion schedule.
    pub fn schedule_info(&self) -> Option<&ScheduleInfo> {
        self.promotion.as_ref().map(|promotion| &promotion.schedule)
    }

    /// `price` with the promotion's percentage taken off.
    pub fn discounted_price(&self, price: Decimal) -> Decimal {
        apply_percent(price, -self.discount_percentage())
    }
}

/// Checkout-time promotion resolution for a specific booking date and time.
#[derive(Debug, Clone)]
pub struct PromotionResolver {
    time_zone: TimeZone,
}

impl PromotionResolver {
    /// Resolver reading fixed-promotion instants in `time_zone`.
    pub fn new(time_zone: TimeZone) -> Self {
        Self { time_zone }
    }

    /// Resolve the promotion covering a booking of `offer` at `date` and `time`.
    pub fn resolve(
        &self,
        offer: OfferUuid,
        date: Date,
        time: Time,
        promotions: &PromotionSet,
    ) -> PromotionEligibility {
        let weekday = date.weekday();

        let recurring = promotions
            .recurring
            .iter()
            .filter(|promotion| promotion.is_active && promotion.offer == offer)
            .find(|promotion| promotion.window.contains_minute(weekday, time));

        if let Some(promotion) = recurring {
            debug!(offer = %offer, promotion = %promotion.uuid, "recurring promotion matched");

            return PromotionEligibility {
                promotion: Some(recurring_match(promotion)),
            };
        }

        let fixed = promotions
            .fixed
            .iter()
            .filter(|promotion| promotion.is_active && promotion.offer == offer)
            .find(|promotion| self.covers_date(promotion, date));

        match fixed {
            Some(promotion) => {
                debug!(offer = %offer, promotion = %promotion.uuid, "fixed promotion matched");

                if promotion.discount_kind != DiscountKind::Percentage {
                    warn!(
                        promotion = %promotion.uuid,
                        kind = ?promotion.discount_kind,
                        "discount is not a percentage and is reported as zero"
                    );
                }

                PromotionEligibility {
                    promotion: Some(EligiblePromotion {
                        uuid: promotion.uuid,
                        title: promotion.title.clone(),
                        promotion_type: PromotionType::Regular,
                        discount_percentage: promotion.percentage(),
                        schedule: ScheduleInfo::DateRange {
                            starts_on: self.date_of(promotion.starts_at),
                            ends_on: self.date_of(promotion.ends_at),
                        },
                    }),
                }
            }
            None => PromotionEligibility::not_eligible(),
        }
    }

    /// Date-only inclusive comparison against the promotion's instants.
    fn covers_date(&self, promotion: &FixedPromotion, date: Date) -> bool {
        self.date_of(promotion.starts_at) <= date && date <= self.date_of(promotion.ends_at)
    }

    fn date_of(&self, timestamp: jiff::Timestamp) -> Date {
        timestamp.to_zoned(self.time_zone.clone()).date()
    }
}

impl Default for PromotionResolver {
    fn default() -> Self {
        Self::new(TimeZone::UTC)
    }
}

fn recurring_match(promotion: &RecurringPromotion) -> EligiblePromotion {
    let (start_time, end_time) = promotion.window.time_range();

    EligiblePromotion {
        uuid: promotion.uuid,
        title: promotion.title.clone(),
        promotion_type: PromotionType::Recurring,
        discount_percentage: promotion.discount_percentage,
        schedule: ScheduleInfo::Weekly {
            days: promotion.window.days.describe(),
            start_time,
            end_time,
        },
    }
}

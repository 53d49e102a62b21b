//! Flash Feed
//!
//! Browse-time view of which promotions are live right now, independent of any
//! booking date.

use jiff::{Zoned, civil::DateTime};
use rust_decimal::Decimal;

use crate::{
    promotions::{FixedPromotion, PromotionSet, PromotionType, RecurringPromotion},
    uuids::{OfferUuid, PromotionUuid},
};

/// A promotion live at the moment the feed was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashOffer {
    /// Discounted offer.
    pub offer: OfferUuid,

    /// Promotion identifier.
    pub promotion: PromotionUuid,

    /// Display title.
    pub title: String,

    /// Recurring or regular.
    pub promotion_type: PromotionType,

    /// Percentage off; zero for discounts not expressed as a percentage.
    pub discount_percentage: Decimal,

    /// Advertised price before the promotion, fixed promotions only.
    pub original_price: Option<Decimal>,

    /// Advertised price during the promotion, fixed promotions only.
    pub promotional_price: Option<Decimal>,

    /// Cap on party size, if any.
    pub max_participants: Option<u32>,

    /// Last instant the current run is live, in the feed's local time.
    pub ends_at: DateTime,
}

/// Builds the list of live promotions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlashFeed;

impl FlashFeed {
    /// Every active promotion live at `now`, best discount first, then soonest to end.
    pub fn active_at(now: &Zoned, promotions: &PromotionSet) -> Vec<FlashOffer> {
        let recurring = promotions
            .recurring
            .iter()
            .filter(|promotion| Self::recurring_is_live(promotion, now))
            .map(|promotion| Self::recurring_offer(promotion, now));

        let fixed = promotions
            .fixed
            .iter()
            .filter(|promotion| Self::fixed_is_live(promotion, now))
            .map(|promotion| Self::fixed_offer(promotion, now));

        let mut offers: Vec<FlashOffer> = recurring.chain(fixed).collect();

        offers.sort_by(|a, b| {
            b.discount_percentage
                .cmp(&a.discount_percentage)
                .then_with(|| a.ends_at.cmp(&b.ends_at))
        });

        offers
    }

    /// Whether the recurring promotion's window is open at `now`.
    pub fn recurring_is_live(promotion: &RecurringPromotion, now: &Zoned) -> bool {
        promotion.is_active && promotion.window.contains_minute(now.weekday(), now.time())
    }

    /// Whether `now` lies between the fixed promotion's instants, inclusive.
    pub fn fixed_is_live(promotion: &FixedPromotion, now: &Zoned) -> bool {
        let instant = now.timestamp();

        promotion.is_active && promotion.starts_at <= instant && instant <= promotion.ends_at
    }

    fn recurring_offer(promotion: &RecurringPromotion, now: &Zoned) -> FlashOffer {
        FlashOffer {
            offer: promotion.offer,
            promotion: promotion.uuid,
            title: promotion.title.clone(),
            promotion_type: PromotionType::Recurring,
            discount_percentage: promotion.discount_percentage,
            original_price: None,
            promotional_price: None,
            max_participants: None,
            ends_at: now.date().to_datetime(promotion.window.closes_at()),
        }
    }

    fn fixed_offer(promotion: &FixedPromotion, now: &Zoned) -> FlashOffer {
        FlashOffer {
            offer: promotion.offer,
            promotion: promotion.uuid,
            title: promotion.title.clone(),
            promotion_type: PromotionType::Regular,
            discount_percentage: promotion.percentage(),
            original_price: Some(promotion.original_price),
            promotional_price: Some(promotion.promotional_price),
            max_participants: promotion.max_participants,
            ends_at: promotion
                .ends_at
                .to_zoned(now.time_zone().clone())
                .datetime(),
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::{
        civil::{date, time},
        tz::TimeZone,
    };
    use testresult::TestResult;

    use crate::{
        promotions::DiscountKind,
        schedule::{DaySet, WeeklyWindow},
    };

    use super::*;

    fn happy_hour(percent: i64) -> RecurringPromotion {
        RecurringPromotion {
            uuid: PromotionUuid::new(),
            offer: OfferUuid::new(),
            title: "Happy hour".to_string(),
            window: WeeklyWindow::new(
                DaySet::from_indices([1]),
                time(17, 0, 0, 0),
                time(19, 0, 0, 0),
            ),
            discount_percentage: Decimal::from(percent),
            is_active: true,
        }
    }

    fn flash_sale(kind: DiscountKind, value: i64) -> TestResult<FixedPromotion> {
        Ok(FixedPromotion {
            uuid: PromotionUuid::new(),
            offer: OfferUuid::new(),
            title: "Flash sale".to_string(),
            discount_kind: kind,
            discount_value: Decimal::from(value),
            original_price: Decimal::from(30),
            promotional_price: Decimal::from(21),
            starts_at: "2026-10-19T16:00:00Z".parse()?,
            ends_at: "2026-10-19T17:30:00Z".parse()?,
            is_active: true,
            max_participants: Some(6),
        })
    }

    fn monday_at(hour: i8, minute: i8) -> TestResult<Zoned> {
        Ok(date(2026, 10, 19)
            .at(hour, minute, 0, 0)
            .to_zoned(TimeZone::UTC)?)
    }

    #[test]
    fn recurring_liveness_uses_current_day_and_time() -> TestResult {
        let promotion = happy_hour(20);

        assert!(FlashFeed::recurring_is_live(&promotion, &monday_at(17, 0)?));
        assert!(FlashFeed::recurring_is_live(&promotion, &monday_at(19, 0)?));
        assert!(!FlashFeed::recurring_is_live(&promotion, &monday_at(19, 1)?));

        let tuesday = date(2026, 10, 20).at(18, 0, 0, 0).to_zoned(TimeZone::UTC)?;

        assert!(!FlashFeed::recurring_is_live(&promotion, &tuesday));

        Ok(())
    }

    #[test]
    fn recurring_run_ends_after_its_closing_minute() -> TestResult {
        let promotions = PromotionSet {
            recurring: vec![happy_hour(20)],
            fixed: Vec::new(),
        };

        let now = date(2026, 10, 19).at(19, 0, 30, 0).to_zoned(TimeZone::UTC)?;
        let feed = FlashFeed::active_at(&now, &promotions);
        let offer = feed.first().ok_or("happy hour should still be live")?;

        assert!(offer.ends_at >= now.datetime());
        assert_eq!(offer.ends_at, date(2026, 10, 19).at(19, 0, 59, 999_999_999));

        Ok(())
    }

    #[test]
    fn fixed_liveness_uses_full_instants() -> TestResult {
        let promotion = flash_sale(DiscountKind::Percentage, 30)?;

        assert!(FlashFeed::fixed_is_live(&promotion, &monday_at(16, 0)?));
        assert!(FlashFeed::fixed_is_live(&promotion, &monday_at(17, 30)?));
        assert!(!FlashFeed::fixed_is_live(&promotion, &monday_at(17, 31)?));
        assert!(!FlashFeed::fixed_is_live(&promotion, &monday_at(15, 59)?));

        Ok(())
    }

    #[test]
    fn feed_orders_by_discount_then_end() -> TestResult {
        let small = happy_hour(10);
        let big = happy_hour(40);
        let flash = flash_sale(DiscountKind::Percentage, 40)?;
        let mut inactive = happy_hour(90);

        inactive.is_active = false;

        let promotions = PromotionSet {
            recurring: vec![small.clone(), big.clone(), inactive],
            fixed: vec![flash.clone()],
        };

        let feed = FlashFeed::active_at(&monday_at(17, 15)?, &promotions);
        let order: Vec<PromotionUuid> = feed.iter().map(|offer| offer.promotion).collect();

        // The flash sale ends at 17:30, before the 19:00 happy hour.
        assert_eq!(order, [flash.uuid, big.uuid, small.uuid]);

        let first = feed.first().ok_or("feed is empty")?;

        assert_eq!(first.original_price, Some(Decimal::from(30)));
        assert_eq!(first.promotional_price, Some(Decimal::from(21)));
        assert_eq!(first.max_participants, Some(6));
        assert_eq!(first.ends_at, date(2026, 10, 19).at(17, 30, 0, 0));

        Ok(())
    }

    #[test]
    fn non_percentage_flash_sale_lists_zero_percent() -> TestResult {
        let promotions = PromotionSet {
            recurring: Vec::new(),
            fixed: vec![flash_sale(DiscountKind::FreeItem, 1)?],
        };

        let feed = FlashFeed::active_at(&monday_at(16, 30)?, &promotions);

        assert_eq!(feed.len(), 1);
        assert_eq!(
            feed.first().map(|offer| offer.discount_percentage),
            Some(Decimal::ZERO)
        );

        Ok(())
    }
}

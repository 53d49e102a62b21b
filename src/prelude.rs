//! Loisir prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    accumulator::{Accumulation, Accumulator, AppliedRule, BreakdownLine, apply_rules},
    discovery::{ActivityScore, ActivitySignals, GeoPoint, haversine_km, rank, within_radius},
    fixtures::{Fixture, FixtureError},
    money::{MoneyConversionError, round_to_minor, to_minor_units, to_money},
    pricing::{
        BasePriceSource, DynamicPricing, PriceCalculation, PriceLine, PricingConfig, PricingError,
        PricingRequest, PricingUnit, SimplePricing, SimplePricingRequest, SimpleQuote,
    },
    promotions::{
        DiscountKind, EligiblePromotion, FixedPromotion, FlashFeed, FlashOffer,
        PromotionEligibility, PromotionResolver, PromotionSet, PromotionType, RecurringPromotion,
        ScheduleInfo,
    },
    receipt::ReceiptError,
    repository::{
        BusinessPricing, InMemoryRepository, OfferListing, PricingOption, PricingRepository,
        RepositoryError,
    },
    rules::{BookingContext, PricingRule, PricingRuleRecord, RuleKind},
    schedule::{DaySet, WeeklyWindow},
    supersession::{LatestOnly, Published, RequestTicket},
    uuids::{BusinessUuid, OfferUuid, OptionUuid, PromotionUuid, RuleUuid},
};

//! Dynamic Pricing
//!
//! Rule-based orchestrator: resolve a base price, fold every matching rule in
//! priority order, then take off the promotion covering the booking slot.

use std::{fmt, sync::Arc};

use jiff::civil::{Date, Time};
use rust_decimal::Decimal;
use tracing::{Span, error, warn};

use crate::{
    accumulator::Accumulator,
    pricing::{BasePriceSource, PriceCalculation, PricingConfig, PricingError},
    promotions::{EligiblePromotion, PromotionEligibility, PromotionResolver},
    repository::PricingRepository,
    rules::{BookingContext, sort_by_priority},
    uuids::{BusinessUuid, OfferUuid},
};

/// What is being priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRequest {
    /// Offer being booked.
    pub offer: OfferUuid,

    /// Business selling the offer.
    pub business: BusinessUuid,

    /// Party size.
    pub participants: u32,

    /// Booking date, if chosen.
    pub date: Option<Date>,

    /// Booking time, if chosen.
    pub time: Option<Time>,
}

impl PricingRequest {
    /// A request with no date or time chosen yet.
    pub fn new(offer: OfferUuid, business: BusinessUuid, participants: u32) -> Self {
        Self {
            offer,
            business,
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

    fn context(&self) -> BookingContext {
        BookingContext {
            participants: self.participants,
            date: self.date,
            time: self.time,
        }
    }
}

/// Rule and promotion based pricing.
#[derive(Clone)]
pub struct DynamicPricing {
    repository: Arc<dyn PricingRepository>,
    config: PricingConfig,
    resolver: PromotionResolver,
}

impl fmt::Debug for DynamicPricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicPricing")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DynamicPricing {
    /// Create an orchestrator reading from `repository`.
    pub fn new(repository: Arc<dyn PricingRepository>, config: PricingConfig) -> Self {
        let resolver = PromotionResolver::new(config.time_zone.clone());

        Self {
            repository,
            config,
            resolver,
        }
    }

    /// Price a booking, logging and swallowing any failure.
    ///
    /// `None` means the price is unavailable and must not be guessed.
    pub async fn calculate(&self, request: &PricingRequest) -> Option<PriceCalculation> {
        match self.try_calculate(request).await {
            Ok(calculation) => Some(calculation),
            Err(err) => {
                error!(offer = %request.offer, error = %err, "price calculation unavailable");

                None
            }
        }
    }

    /// Price a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails or an amount overflows.
    #[tracing::instrument(
        name = "pricing.dynamic.calculate",
        skip(self),
        fields(
            offer = %request.offer,
            participants = request.participants,
            base_source = tracing::field::Empty,
            rule_count = tracing::field::Empty,
            promotion = tracing::field::Empty
        ),
        err
    )]
    pub async fn try_calculate(
        &self,
        request: &PricingRequest,
    ) -> Result<PriceCalculation, PricingError> {
        let span = Span::current();

        let (base_price, base_source) = self
            .resolve_base_price(request.offer, request.business)
            .await?;

        span.record("base_source", tracing::field::debug(base_source));

        let mut rules = self
            .repository
            .active_rules(request.business, request.offer)
            .await?;

        // Repositories promise priority order; don't rely on it.
        sort_by_priority(&mut rules);

        let context = request.context();
        let mut accumulator = Accumulator::seed(base_price, request.participants);

        for rule in rules
            .iter()
            .filter(|rule| rule.applies_to_offer(request.offer) && rule.matches(&context))
        {
            accumulator.apply(rule);
        }

        let promotion = self.resolve_promotion(request).await?;

        if let Some(eligible) = promotion
            .promotion
            .as_ref()
            .filter(|eligible| eligible.discount_percentage > Decimal::ZERO)
        {
            span.record("promotion", tracing::field::display(eligible.uuid));

            accumulator.discount(&promotion_label(eligible), eligible.discount_percentage);
        }

        let accumulation = accumulator.finish();

        span.record(
            "rule_count",
            tracing::field::display(accumulation.applied_rules.len()),
        );

        PriceCalculation::from_accumulation(
            base_price,
            base_source,
            accumulation,
            promotion,
            self.config.currency,
        )
    }

    /// Resolve the unit price: business default, then the offer's base price,
    /// then its default pricing option, then zero.
    ///
    /// Zero and negative prices count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if any lookup fails.
    pub async fn resolve_base_price(
        &self,
        offer: OfferUuid,
        business: BusinessUuid,
    ) -> Result<(Decimal, BasePriceSource), PricingError> {
        let business_default = self
            .repository
            .business_default_pricing(business)
            .await?
            .map(|entry| entry.price)
            .filter(is_set);

        if let Some(price) = business_default {
            return Ok((price, BasePriceSource::BusinessDefault));
        }

        let offer_base = self.repository.offer_base_price(offer).await?;

        if let Some(price) = offer_base.filter(is_set) {
            return Ok((price, BasePriceSource::OfferBasePrice));
        }

        let default_option = self
            .repository
            .offer_default_pricing_option(offer)
            .await?
            .map(|option| option.price)
            .filter(is_set);

        if let Some(price) = default_option {
            return Ok((price, BasePriceSource::DefaultOption));
        }

        warn!(offer = %offer, business = %business, "no pricing configured, base price is zero");

        Ok((Decimal::ZERO, BasePriceSource::Unconfigured))
    }

    async fn resolve_promotion(
        &self,
        request: &PricingRequest,
    ) -> Result<PromotionEligibility, PricingError> {
        let (Some(date), Some(time)) = (request.date, request.time) else {
            return Ok(PromotionEligibility::not_eligible());
        };

        let promotions = self.repository.active_promotions(request.offer).await?;

        Ok(self
            .resolver
            .resolve(request.offer, date, time, &promotions))
    }
}

fn is_set(price: &Decimal) -> bool {
    *price > Decimal::ZERO
}

fn promotion_label(promotion: &EligiblePromotion) -> String {
    let title = if promotion.title.is_empty() {
        "Promotion"
    } else {
        promotion.title.as_str()
    };

    format!("{title} (-{}%)", promotion.discount_percentage.normalize())
}

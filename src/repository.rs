//! Pricing Repository
//!
//! Read-only access to the pricing data the orchestrators need. The engine never
//! writes; rule and promotion edits go through the backing store directly.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    discovery::GeoPoint,
    promotions::{FixedPromotion, PromotionSet, RecurringPromotion},
    rules::{PricingRule, sort_by_priority},
    uuids::{BusinessUuid, OfferUuid, OptionUuid},
};

/// Errors surfaced by a repository.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The offer does not exist.
    #[error("offer {0} not found")]
    OfferNotFound(OfferUuid),

    /// The store could not be reached or answered with an error.
    #[error("pricing store unavailable: {0}")]
    Unavailable(String),
}

/// A business-level pricing entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BusinessPricing {
    /// Owning business.
    pub business: BusinessUuid,

    /// Entry label.
    #[serde(default)]
    pub label: String,

    /// Unit price.
    pub price: Decimal,

    /// Lower values are listed first; the first active entry is the default.
    #[serde(default)]
    pub display_order: i32,

    /// Inactive entries are never the default.
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

/// One way an offer can be priced, e.g. "Per game" or "Per hour".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PricingOption {
    /// Option identifier.
    #[serde(default)]
    pub uuid: OptionUuid,

    /// Option name, also used to infer the pricing unit.
    pub name: String,

    /// Unit price.
    pub price: Decimal,

    /// The option used when none is chosen.
    #[serde(default)]
    pub is_default: bool,
}

/// A bookable offer as stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OfferListing {
    /// Offer identifier.
    pub uuid: OfferUuid,

    /// Selling business.
    pub business: BusinessUuid,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Offer-level base price.
    #[serde(default)]
    pub base_price: Option<Decimal>,

    /// Pricing options.
    #[serde(default)]
    pub pricing_options: Vec<PricingOption>,

    /// Venue location.
    #[serde(default)]
    pub location: Option<GeoPoint>,

    /// Average customer rating out of 5.
    #[serde(default)]
    pub rating: Option<f64>,
}

fn active_by_default() -> bool {
    true
}

/// Read-only pricing data access.
#[automock]
#[async_trait]
pub trait PricingRepository: Send + Sync {
    /// The business's default active pricing entry (lowest display order).
    async fn business_default_pricing(&self, business: BusinessUuid)
    -> Result<Option<BusinessPricing>, RepositoryError>;

    /// The offer's own base price.
    async fn offer_base_price(&self, offer: OfferUuid) -> Result<Option<Decimal>, RepositoryError>;

    /// The offer's default pricing option.
    async fn offer_default_pricing_option(&self, offer: OfferUuid)
    -> Result<Option<PricingOption>, RepositoryError>;

    /// Every pricing option of the offer, in display order.
    async fn offer_pricing_options(&self, offer: OfferUuid)
    -> Result<Vec<PricingOption>, RepositoryError>;

    /// Active rules of `business` scoped to `offer` or business-wide, highest priority first.
    async fn active_rules(&self, business: BusinessUuid, offer: OfferUuid)
    -> Result<Vec<PricingRule>, RepositoryError>;

    /// Active promotions attached to `offer`.
    async fn active_promotions(&self, offer: OfferUuid) -> Result<PromotionSet, RepositoryError>;
}

/// Pick the default entry: the active one with the lowest display order.
pub fn select_default_pricing(entries: &[BusinessPricing]) -> Option<&BusinessPricing> {
    entries
        .iter()
        .filter(|entry| entry.is_active)
        .min_by_key(|entry| entry.display_order)
}

/// Pick the option flagged as default.
pub fn select_default_option(options: &[PricingOption]) -> Option<&PricingOption> {
    options.iter().find(|option| option.is_default)
}

/// Repository holding everything in memory, used by fixtures and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    business_pricing: FxHashMap<BusinessUuid, Vec<BusinessPricing>>,
    offers: FxHashMap<OfferUuid, OfferListing>,
    rules: Vec<PricingRule>,
    promotions: PromotionSet,
}

impl InMemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a business pricing entry.
    pub fn insert_business_pricing(&mut self, entry: BusinessPricing) -> &mut Self {
        self.business_pricing
            .entry(entry.business)
            .or_default()
            .push(entry);

        self
    }

    /// Add or replace an offer.
    pub fn insert_offer(&mut self, offer: OfferListing) -> &mut Self {
        self.offers.insert(offer.uuid, offer);

        self
    }

    /// Add a rule. Fetch order is insertion order.
    pub fn insert_rule(&mut self, rule: PricingRule) -> &mut Self {
        self.rules.push(rule);

        self
    }

    /// Add a recurring promotion.
    pub fn insert_recurring(&mut self, promotion: RecurringPromotion) -> &mut Self {
        self.promotions.recurring.push(promotion);

        self
    }

    /// Add a fixed promotion.
    pub fn insert_fixed(&mut self, promotion: FixedPromotion) -> &mut Self {
        self.promotions.fixed.push(promotion);

        self
    }

    /// Look up an offer.
    pub fn offer(&self, offer: OfferUuid) -> Option<&OfferListing> {
        self.offers.get(&offer)
    }

    /// Every offer, in no particular order.
    pub fn offers(&self) -> impl Iterator<Item = &OfferListing> {
        self.offers.values()
    }

    /// Every promotion, active or not, across all offers.
    pub fn promotions(&self) -> &PromotionSet {
        &self.promotions
    }

    fn listing(&self, offer: OfferUuid) -> Result<&OfferListing, RepositoryError> {
        self.offers
            .get(&offer)
            .ok_or(RepositoryError::OfferNotFound(offer))
    }
}

#[async_trait]
impl PricingRepository for InMemoryRepository {
    async fn business_default_pricing(
        &self,
        business: BusinessUuid,
    ) -> Result<Option<BusinessPricing>, RepositoryError> {
        Ok(self
            .business_pricing
            .get(&business)
            .and_then(|entries| select_default_pricing(entries))
            .cloned())
    }

    async fn offer_base_price(&self, offer: OfferUuid) -> Result<Option<Decimal>, RepositoryError> {
        Ok(self.listing(offer)?.base_price)
    }

    async fn offer_default_pricing_option(
        &self,
        offer: OfferUuid,
    ) -> Result<Option<PricingOption>, RepositoryError> {
        Ok(select_default_option(&self.listing(offer)?.pricing_options).cloned())
    }

    async fn offer_pricing_options(
        &self,
        offer: OfferUuid,
    ) -> Result<Vec<PricingOption>, RepositoryError> {
        Ok(self.listing(offer)?.pricing_options.clone())
    }

    async fn active_rules(
        &self,
        business: BusinessUuid,
        offer: OfferUuid,
    ) -> Result<Vec<PricingRule>, RepositoryError> {
        let mut rules: Vec<PricingRule> = self
            .rules
            .iter()
            .filter(|rule| rule.business == business && rule.applies_to_offer(offer))
            .cloned()
            .collect();

        sort_by_priority(&mut rules);

        Ok(rules)
    }

    async fn active_promotions(&self, offer: OfferUuid) -> Result<PromotionSet, RepositoryError> {
        Ok(PromotionSet {
            recurring: self
                .promotions
                .recurring
                .iter()
                .filter(|promotion| promotion.is_active && promotion.offer == offer)
                .cloned()
                .collect(),
            fixed: self
                .promotions
                .fixed
                .iter()
                .filter(|promotion| promotion.is_active && promotion.offer == offer)
                .cloned()
                .collect(),
        })
    }
}

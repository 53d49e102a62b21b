//! Pricing
//!
//! Orchestrators that turn an offer and a booking context into a priced,
//! explained calculation. [`DynamicPricing`] folds conditional rules and
//! promotions over a base price; [`SimplePricing`] multiplies a pricing option
//! by its inferred unit.

use jiff::tz::TimeZone;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    accumulator::{Accumulation, AppliedRule},
    money::{MoneyConversionError, round_to_minor, to_minor_units, to_money},
    promotions::PromotionEligibility,
    repository::RepositoryError,
    uuids::{OfferUuid, OptionUuid},
};

pub mod dynamic;
pub mod simple;

pub use dynamic::{DynamicPricing, PricingRequest};
pub use simple::{PricingUnit, SimplePricing, SimplePricingRequest, SimpleQuote};

/// Errors raised while pricing a booking.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Wrapped repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Wrapped money conversion error.
    #[error(transparent)]
    Money(#[from] MoneyConversionError),

    /// The offer has no pricing option to quote from.
    #[error("offer {0} has no pricing option")]
    NoPricingOption(OfferUuid),

    /// The requested pricing option does not belong to the offer.
    #[error("pricing option {option} not found on offer {offer}")]
    UnknownPricingOption {
        /// Offer being priced.
        offer: OfferUuid,

        /// Requested option.
        option: OptionUuid,
    },
}

/// Settings shared by both orchestrators.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Currency every amount is expressed in.
    pub currency: &'static Currency,

    /// Zone used to read fixed-promotion instants as calendar dates.
    pub time_zone: TimeZone,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: iso::EUR,
            time_zone: TimeZone::UTC,
        }
    }
}

/// Where the base price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasePriceSource {
    /// The business's default active pricing entry.
    BusinessDefault,

    /// The offer's own base price.
    OfferBasePrice,

    /// The offer's default pricing option.
    DefaultOption,

    /// Nothing configured; the base price is zero.
    Unconfigured,
}

/// A breakdown line rounded to minor units.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLine {
    /// Label.
    pub description: String,

    /// Signed amount.
    pub amount: Money<'static, Currency>,
}

/// A fully explained price for one booking context.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceCalculation {
    /// Unit price before any adjustment.
    pub base_price: Money<'static, Currency>,

    /// Where [`Self::base_price`] was resolved from.
    pub base_source: BasePriceSource,

    /// Amount to charge, never negative.
    pub final_price: Money<'static, Currency>,

    /// Rules folded into the price, in application order. Savings are rounded
    /// to minor units.
    pub applied_rules: SmallVec<[AppliedRule; 4]>,

    /// Explanation lines; the first is the base computation.
    pub breakdown: Vec<PriceLine>,

    /// Sum of every step that lowered the price.
    pub total_savings: Money<'static, Currency>,

    /// Promotion resolved for the booking date and time.
    pub promotion: PromotionEligibility,
}

impl PriceCalculation {
    /// Round an accumulation to minor units and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] if an amount overflows minor units.
    pub fn from_accumulation(
        base_price: Decimal,
        base_source: BasePriceSource,
        accumulation: Accumulation,
        promotion: PromotionEligibility,
        currency: &'static Currency,
    ) -> Result<Self, PricingError> {
        let breakdown = accumulation
            .breakdown
            .into_iter()
            .map(|line| {
                Ok(PriceLine {
                    amount: to_money(line.amount, currency)?,
                    description: line.description,
                })
            })
            .collect::<Result<Vec<_>, MoneyConversionError>>()?;

        let applied_rules = accumulation
            .applied_rules
            .into_iter()
            .map(|mut rule| {
                rule.savings = rule
                    .savings
                    .map(|savings| round_to_minor(savings, currency));

                rule
            })
            .collect();

        Ok(Self {
            base_price: to_money(base_price, currency)?,
            base_source,
            final_price: to_money(accumulation.final_price, currency)?,
            applied_rules,
            breakdown,
            total_savings: to_money(accumulation.total_savings, currency)?,
            promotion,
        })
    }

    /// The final price in integer minor units, ready for a payment intent.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyConversionError::OutOfRange`] if the amount does not fit.
    pub fn amount_to_charge_minor(&self) -> Result<i64, MoneyConversionError> {
        to_minor_units(*self.final_price.amount(), self.final_price.currency())
    }

    /// Whether no pricing source was configured, so the zero base price is a
    /// configuration gap rather than a free offer.
    pub fn needs_configuration(&self) -> bool {
        self.base_source == BasePriceSource::Unconfigured
    }

    /// Currency used for every amount.
    pub fn currency(&self) -> &'static Currency {
        self.final_price.currency()
    }
}

//! Simple Pricing
//!
//! Unit-based quotes: a pricing option's price times whatever its unit
//! multiplies by. No rules or promotions are involved.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tracing::error;

use crate::{
    money::to_money,
    pricing::{PriceLine, PricingConfig, PricingError},
    repository::{PricingOption, PricingRepository, select_default_option},
    uuids::{OfferUuid, OptionUuid},
};

/// What one unit of a pricing option buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingUnit {
    /// Price per game, per participant.
    PerGame,

    /// Price per hour for the whole party.
    PerHour,

    /// Price per participant for one session.
    PerSession,

    /// Price per participant per unit.
    PerPerson,
}

impl PricingUnit {
    /// Infer the unit from an option name.
    pub fn infer(name: &str) -> Self {
        let name = name.to_lowercase();

        if name.contains("partie") || name.contains("game") {
            Self::PerGame
        } else if name.contains("heure") || name.contains("hour") {
            Self::PerHour
        } else if name.contains("session") {
            Self::PerSession
        } else {
            Self::PerPerson
        }
    }

    /// Total for `participants` people booking `units` units at `unit_price`.
    pub fn total(self, unit_price: Decimal, participants: u32, units: u32) -> Decimal {
        let participants = Decimal::from(participants);
        let units = Decimal::from(units);

        match self {
            Self::PerGame | Self::PerPerson => unit_price * units * participants,
            Self::PerHour => unit_price * units,
            Self::PerSession => unit_price * participants,
        }
    }

    fn describe(self, participants: u32, units: u32) -> String {
        match self {
            Self::PerGame => format!("{units} game(s) × {participants} participant(s)"),
            Self::PerHour => format!("{units} hour(s)"),
            Self::PerSession => format!("1 session × {participants} participant(s)"),
            Self::PerPerson => format!("{participants} participant(s) × {units} unit(s)"),
        }
    }
}

impl fmt::Display for PricingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PerGame => "per game",
            Self::PerHour => "per hour",
            Self::PerSession => "per session",
            Self::PerPerson => "per person",
        })
    }
}

/// What is being quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplePricingRequest {
    /// Offer being booked.
    pub offer: OfferUuid,

    /// Chosen option; the offer's default when absent.
    pub option: Option<OptionUuid>,

    /// Party size.
    pub participants: u32,

    /// Games, hours, etc. Zero counts as one.
    pub units: u32,
}

/// A unit-based quote.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleQuote {
    /// Quoted option.
    pub option: OptionUuid,

    /// Option name.
    pub option_name: String,

    /// Inferred unit.
    pub unit: PricingUnit,

    /// Option price per unit.
    pub unit_price: Money<'static, Currency>,

    /// Party size.
    pub participants: u32,

    /// Units booked, at least one.
    pub units: u32,

    /// Amount to charge.
    pub total: Money<'static, Currency>,

    /// The formula, as a single line.
    pub breakdown: PriceLine,
}

/// Option-based pricing.
#[derive(Clone)]
pub struct SimplePricing {
    repository: Arc<dyn PricingRepository>,
    config: PricingConfig,
}

impl fmt::Debug for SimplePricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplePricing")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SimplePricing {
    /// Create an orchestrator reading from `repository`.
    pub fn new(repository: Arc<dyn PricingRepository>, config: PricingConfig) -> Self {
        Self { repository, config }
    }

    /// Quote an option directly.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] if the total overflows minor units.
    pub fn quote(
        &self,
        option: &PricingOption,
        participants: u32,
        units: u32,
    ) -> Result<SimpleQuote, PricingError> {
        let units = units.max(1);
        let unit = PricingUnit::infer(&option.name);
        let total = to_money(
            unit.total(option.price, participants, units),
            self.config.currency,
        )?;

        Ok(SimpleQuote {
            option: option.uuid,
            option_name: option.name.clone(),
            unit,
            unit_price: to_money(option.price, self.config.currency)?,
            participants,
            units,
            total,
            breakdown: PriceLine {
                description: format!("{} ({})", option.name, unit.describe(participants, units)),
                amount: total,
            },
        })
    }

    /// Quote a booking, logging and swallowing any failure.
    pub async fn calculate(&self, request: &SimplePricingRequest) -> Option<SimpleQuote> {
        match self.try_calculate(request).await {
            Ok(quote) => Some(quote),
            Err(err) => {
                error!(offer = %request.offer, error = %err, "quote unavailable");

                None
            }
        }
    }

    /// Quote a booking with the requested option, the default option, or the
    /// first option, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails, the requested option is not
    /// on the offer, or the offer has no options.
    #[tracing::instrument(
        name = "pricing.simple.calculate",
        skip(self),
        fields(offer = %request.offer),
        err
    )]
    pub async fn try_calculate(
        &self,
        request: &SimplePricingRequest,
    ) -> Result<SimpleQuote, PricingError> {
        let options = self
            .repository
            .offer_pricing_options(request.offer)
            .await?;

        let option = match request.option {
            Some(uuid) => options.iter().find(|option| option.uuid == uuid).ok_or(
                PricingError::UnknownPricingOption {
                    offer: request.offer,
                    option: uuid,
                },
            )?,
            None => select_default_option(&options)
                .or_else(|| options.first())
                .ok_or(PricingError::NoPricingOption(request.offer))?,
        };

        self.quote(option, request.participants, request.units)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::repository::{MockPricingRepository, RepositoryError};

    use super::*;

    fn option(name: &str, price: i64, is_default: bool) -> PricingOption {
        PricingOption {
            uuid: OptionUuid::new(),
            name: name.to_string(),
            price: Decimal::from(price),
            is_default,
        }
    }

    fn engine(options: Vec<PricingOption>) -> SimplePricing {
        let mut repository = MockPricingRepository::new();

        repository
            .expect_offer_pricing_options()
            .returning(move |_| Ok(options.clone()));

        SimplePricing::new(Arc::new(repository), PricingConfig::default())
    }

    fn request(option: Option<OptionUuid>, participants: u32, units: u32) -> SimplePricingRequest {
        SimplePricingRequest {
            offer: OfferUuid::new(),
            option,
            participants,
            units,
        }
    }

    #[test]
    fn unit_is_inferred_from_name() {
        assert_eq!(
            PricingUnit::infer("Partie de bowling"),
            PricingUnit::PerGame
        );
        assert_eq!(PricingUnit::infer("Per GAME"), PricingUnit::PerGame);
        assert_eq!(
            PricingUnit::infer("Location à l'heure"),
            PricingUnit::PerHour
        );
        assert_eq!(PricingUnit::infer("Hourly rental"), PricingUnit::PerHour);
        assert_eq!(PricingUnit::infer("Session VR"), PricingUnit::PerSession);
        assert_eq!(PricingUnit::infer("Entrée"), PricingUnit::PerPerson);
    }

    #[test]
    fn unit_formulas() {
        let price = Decimal::from(8);

        assert_eq!(PricingUnit::PerGame.total(price, 4, 2), Decimal::from(64));
        assert_eq!(PricingUnit::PerHour.total(price, 4, 2), Decimal::from(16));
        assert_eq!(
            PricingUnit::PerSession.total(price, 4, 2),
            Decimal::from(32)
        );
        assert_eq!(PricingUnit::PerPerson.total(price, 4, 2), Decimal::from(64));
    }

    #[test]
    fn zero_units_count_as_one() -> TestResult {
        let quote = engine(Vec::new()).quote(&option("Per hour", 30, true), 6, 0)?;

        assert_eq!(quote.units, 1);
        assert_eq!(quote.total, Money::from_minor(3000, iso::EUR));
        assert_eq!(quote.breakdown.description, "Per hour (1 hour(s))");

        Ok(())
    }

    #[tokio::test]
    async fn picks_named_then_default_then_first() -> TestResult {
        let game = option("Per game", 8, false);
        let hour = option("Per hour", 30, true);
        let chosen = game.uuid;

        let pricing = engine(vec![game.clone(), hour]);

        let named = pricing.try_calculate(&request(Some(chosen), 4, 2)).await?;
        let default = pricing.try_calculate(&request(None, 4, 2)).await?;

        assert_eq!(named.total, Money::from_minor(6400, iso::EUR));
        assert_eq!(default.unit, PricingUnit::PerHour);
        assert_eq!(default.total, Money::from_minor(6000, iso::EUR));

        let only_game = engine(vec![game]);
        let first = only_game.try_calculate(&request(None, 2, 1)).await?;

        assert_eq!(first.option, chosen);

        Ok(())
    }

    #[tokio::test]
    async fn missing_options_are_errors() {
        let pricing = engine(vec![option("Per game", 8, false)]);

        assert!(matches!(
            engine(Vec::new()).try_calculate(&request(None, 2, 1)).await,
            Err(PricingError::NoPricingOption(_))
        ));
        assert!(matches!(
            pricing.try_calculate(&request(Some(OptionUuid::new()), 2, 1)).await,
            Err(PricingError::UnknownPricingOption { .. })
        ));
        assert_eq!(
            pricing.calculate(&request(Some(OptionUuid::new()), 2, 1)).await,
            None
        );
    }

    #[tokio::test]
    async fn repository_failure_is_unavailable() {
        let mut repository = MockPricingRepository::new();

        repository
            .expect_offer_pricing_options()
            .returning(|_| Err(RepositoryError::Unavailable("down".to_string())));

        let pricing = SimplePricing::new(Arc::new(repository), PricingConfig::default());

        assert_eq!(pricing.calculate(&request(None, 2, 1)).await, None);
    }
}

//! Fixtures
//!
//! YAML fixture sets loaded into an [`InMemoryRepository`]. A set named
//! `bowling` lives in `offers/bowling.yml`, `rules/bowling.yml` and
//! `promotions/bowling.yml` under the base path.

use std::{fs, path::PathBuf, sync::Arc};

use jiff::tz::TimeZone;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    fixtures::{
        offers::{OffersFixture, parse_currency, parse_time_zone},
        promotions::PromotionsFixture,
        rules::RulesFixture,
    },
    pricing::PricingConfig,
    promotions::{PromotionDataError, RecurringPromotion},
    repository::{InMemoryRepository, OfferListing},
    rules::PricingRule,
    uuids::OfferUuid,
};

pub mod offers;
pub mod promotions;
pub mod rules;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Unknown time zone
    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),

    /// Invalid promotion data
    #[error("Invalid promotion data: {0}")]
    InvalidPromotionData(#[from] PromotionDataError),

    /// Offer not found
    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    /// No offers loaded yet
    #[error("No offers loaded yet; currency unknown")]
    NoCurrency,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Loaded pricing data
    repository: InMemoryRepository,

    /// Fixture key -> offer identifier
    offer_keys: FxHashMap<String, OfferUuid>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,

    /// Zone fixed promotions are read in
    time_zone: TimeZone,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            repository: InMemoryRepository::new(),
            offer_keys: FxHashMap::default(),
            currency: None,
            time_zone: TimeZone::UTC,
        }
    }

    /// Load business pricing and offers from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or names an
    /// unknown currency or time zone.
    pub fn load_offers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: OffersFixture = self.read("offers", name)?;

        self.currency = Some(parse_currency(&fixture.currency)?);
        self.time_zone = parse_time_zone(fixture.time_zone.as_deref())?;

        for entry in fixture.business_pricing {
            self.repository.insert_business_pricing(entry);
        }

        for (key, offer) in fixture.offers {
            self.offer_keys.insert(key, offer.uuid);
            self.repository.insert_offer(offer);
        }

        Ok(self)
    }

    /// Load pricing rules from a YAML fixture file
    ///
    /// A rule whose conditions have the wrong shape still loads, but never
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_rules(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: RulesFixture = self.read("rules", name)?;

        for record in fixture.rules {
            self.repository.insert_rule(PricingRule::from(record));
        }

        Ok(self)
    }

    /// Load promotions from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a recurring
    /// window bound is not a clock time.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: PromotionsFixture = self.read("promotions", name)?;

        for record in fixture.recurring {
            self.repository
                .insert_recurring(RecurringPromotion::try_from(record)?);
        }

        for promotion in fixture.fixed {
            self.repository.insert_fixed(promotion);
        }

        Ok(self)
    }

    /// Load a complete fixture set (offers, rules, and promotions with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Load a complete fixture set into this fixture
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_offers(name)?
            .load_rules(name)?
            .load_promotions(name)
    }

    /// Get an offer by its fixture key
    ///
    /// # Errors
    ///
    /// Returns an error if the offer is not found.
    pub fn offer(&self, key: &str) -> Result<&OfferListing, FixtureError> {
        self.offer_keys
            .get(key)
            .and_then(|uuid| self.repository.offer(*uuid))
            .ok_or_else(|| FixtureError::OfferNotFound(key.to_string()))
    }

    /// Fixture keys of every loaded offer, sorted
    pub fn offer_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.offer_keys.keys().map(String::as_str).collect();

        keys.sort_unstable();

        keys
    }

    /// Get the loaded repository
    pub fn repository(&self) -> &InMemoryRepository {
        &self.repository
    }

    /// Share the loaded repository with the pricing engines
    pub fn shared_repository(&self) -> Arc<InMemoryRepository> {
        Arc::new(self.repository.clone())
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no offers have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Pricing settings for the set
    ///
    /// # Errors
    ///
    /// Returns an error if no offers have been loaded yet.
    pub fn config(&self) -> Result<PricingConfig, FixtureError> {
        Ok(PricingConfig {
            currency: self.currency()?,
            time_zone: self.time_zone.clone(),
        })
    }

    fn read<T>(&self, category: &str, name: &str) -> Result<T, FixtureError>
    where
        T: serde::de::DeserializeOwned,
    {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{repository::PricingRepository, rules::BookingContext};

    use super::*;

    const OFFER: &str = "7d4f1c2a-9b3e-4f5a-8c6d-0e1f2a3b4c5d";
    const BUSINESS: &str = "3c2b1a09-8f7e-4d6c-9b5a-4e3d2c1b0a9f";

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    fn write_set(base: &Path, recurring_start: &str) -> TestResult {
        write_fixture(
            base,
            "offers",
            "lanes",
            &format!(
                "currency: EUR
offers:
  lane:
    uuid: {OFFER}
    business: {BUSINESS}
    name: Bowling lane
    base_price: 20
"
            ),
        )?;

        write_fixture(
            base,
            "rules",
            "lanes",
            &format!(
                "rules:
  - business: {BUSINESS}
    rule_name: Groups
    rule_type: participant_tiers
    conditions:
      min_participants: 3
    price_modifier: -10
    is_percentage: true
    priority: 1
"
            ),
        )?;

        write_fixture(
            base,
            "promotions",
            "lanes",
            &format!(
                "recurring:
  - offer: {OFFER}
    title: Afterwork
    days_of_week: [3]
    start_time: \"{recurring_start}\"
    end_time: \"20:00\"
    discount_percentage: 20
"
            ),
        )?;

        Ok(())
    }

    #[tokio::test]
    async fn loads_a_complete_set() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_set(dir.path(), "18:00")?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_set("lanes")?;

        let offer = fixture.offer("lane")?;

        assert_eq!(offer.base_price, Some(Decimal::from(20)));
        assert_eq!(fixture.offer_keys(), ["lane"]);
        assert_eq!(fixture.currency()?.iso_alpha_code, "EUR");

        let rules = fixture
            .repository()
            .active_rules(offer.business, offer.uuid)
            .await?;

        assert_eq!(rules.len(), 1);
        assert_eq!(
            fixture
                .repository()
                .active_promotions(offer.uuid)
                .await?
                .recurring
                .len(),
            1
        );

        Ok(())
    }

    #[tokio::test]
    async fn mistyped_rule_does_not_sink_the_set() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_set(dir.path(), "18:00")?;
        write_fixture(
            dir.path(),
            "rules",
            "lanes",
            &format!(
                "rules:
  - business: {BUSINESS}
    rule_name: Groups
    rule_type: participant_tiers
    conditions:
      min_participants: 3
    price_modifier: -10
    is_percentage: true
    priority: 1
  - business: {BUSINESS}
    rule_name: Weekends
    rule_type: day_of_week
    conditions:
      days: weekends
    price_modifier: 5
"
            ),
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_set("lanes")?;

        let offer = fixture.offer("lane")?;
        let rules = fixture
            .repository()
            .active_rules(offer.business, offer.uuid)
            .await?;

        // 2026-10-24 is a Saturday.
        let context = BookingContext::new(4).on(jiff::civil::date(2026, 10, 24));
        let applied: Vec<&str> = rules
            .iter()
            .filter(|rule| rule.matches(&context))
            .map(|rule| rule.name.as_str())
            .collect();

        assert_eq!(rules.len(), 2);
        assert_eq!(applied, ["Groups"]);

        Ok(())
    }

    #[test]
    fn bad_window_time_is_reported() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_set(dir.path(), "six pm")?;

        let mut fixture = Fixture::with_base_path(dir.path());

        assert!(matches!(
            fixture.load_set("lanes"),
            Err(FixtureError::InvalidPromotionData(_))
        ));

        Ok(())
    }

    #[test]
    fn missing_set_is_an_io_error() {
        let mut fixture = Fixture::with_base_path("./does-not-exist");

        assert!(matches!(
            fixture.load_offers("nothing"),
            Err(FixtureError::Io(_))
        ));
        assert!(matches!(fixture.currency(), Err(FixtureError::NoCurrency)));
    }

    #[test]
    fn unknown_offer_key_is_an_error() {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.offer("ghost"),
            Err(FixtureError::OfferNotFound(key)) if key == "ghost"
        ));
    }
}

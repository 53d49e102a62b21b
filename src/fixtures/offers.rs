//! Offers Fixtures

use jiff::tz::TimeZone;
use rustc_hash::FxHashMap;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    repository::{BusinessPricing, OfferListing},
};

/// Offers fixture file.
#[derive(Debug, Deserialize)]
pub struct OffersFixture {
    /// ISO currency code shared by every amount of the set.
    pub currency: String,

    /// IANA zone name, UTC when absent.
    #[serde(default)]
    pub time_zone: Option<String>,

    /// Business-level pricing entries.
    #[serde(default)]
    pub business_pricing: Vec<BusinessPricing>,

    /// Offers keyed by a fixture-local name.
    pub offers: FxHashMap<String, OfferListing>,
}

/// Resolve an ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for unsupported codes.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "EUR" => Ok(iso::EUR),
        "GBP" => Ok(iso::GBP),
        "USD" => Ok(iso::USD),
        "CHF" => Ok(iso::CHF),
        "CAD" => Ok(iso::CAD),
        _ => Err(FixtureError::UnknownCurrency(code.to_string())),
    }
}

/// Resolve a time zone name.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownTimeZone`] if the zone database has no such zone.
pub fn parse_time_zone(name: Option<&str>) -> Result<TimeZone, FixtureError> {
    match name.map(str::trim) {
        None | Some("") => Ok(TimeZone::UTC),
        Some(name) if name.eq_ignore_ascii_case("utc") => Ok(TimeZone::UTC),
        Some(name) => {
            TimeZone::get(name).map_err(|_err| FixtureError::UnknownTimeZone(name.to_string()))
        }
    }
}

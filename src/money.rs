//! Money
//!
//! The engine works on [`Decimal`] major-unit amounts and only turns them into
//! [`Money`] at the edges, rounding once to the currency's minor units.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors converting a decimal amount into minor units.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyConversionError {
    /// The amount does not fit in an `i64` of minor units.
    #[error("amount {0} cannot be represented in minor units")]
    OutOfRange(Decimal),
}

/// Round a major-unit amount to the currency's minor-unit precision.
pub fn round_to_minor(amount: Decimal, currency: &Currency) -> Decimal {
    amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a major-unit amount into integer minor units.
///
/// # Errors
///
/// Returns [`MoneyConversionError::OutOfRange`] if the scaled amount overflows.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Result<i64, MoneyConversionError> {
    let scale = Decimal::from_i64(10_i64.pow(currency.exponent))
        .ok_or(MoneyConversionError::OutOfRange(amount))?;

    amount
        .checked_mul(scale)
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or(MoneyConversionError::OutOfRange(amount))
}

/// Convert a major-unit amount into [`Money`], rounding to minor units.
///
/// # Errors
///
/// Returns [`MoneyConversionError::OutOfRange`] if the scaled amount overflows.
pub fn to_money(
    amount: Decimal,
    currency: &Currency,
) -> Result<Money<'_, Currency>, MoneyConversionError> {
    Ok(Money::from_minor(to_minor_units(amount, currency)?, currency))
}

/// Apply a signed percentage to an amount: `amount * (1 + percent / 100)`.
pub fn apply_percent(amount: Decimal, percent: Decimal) -> Decimal {
    amount + percent_of(amount, percent)
}

/// `percent` percent of `amount`, sign preserved.
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, JPY};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(
            round_to_minor(Decimal::new(10_005, 3), EUR),
            Decimal::new(1001, 2)
        );
        assert_eq!(
            round_to_minor(Decimal::new(-10_005, 3), EUR),
            Decimal::new(-1001, 2)
        );
        assert_eq!(round_to_minor(Decimal::new(10_004, 3), EUR), Decimal::TEN);
    }

    #[test]
    fn minor_units_follow_currency_exponent() -> TestResult {
        assert_eq!(to_minor_units(Decimal::from(72), EUR)?, 7200);
        assert_eq!(to_minor_units(Decimal::new(724, 1), JPY)?, 72);

        Ok(())
    }

    #[test]
    fn to_money_builds_minor_amount() -> TestResult {
        assert_eq!(
            to_money(Decimal::new(19_999, 3), EUR)?,
            Money::from_minor(2000, EUR)
        );

        Ok(())
    }

    #[test]
    fn overflow_is_reported() {
        let result = to_minor_units(Decimal::MAX, EUR);

        assert!(matches!(result, Err(MoneyConversionError::OutOfRange(_))));
    }

    #[test]
    fn percentages_are_signed() {
        assert_eq!(
            apply_percent(Decimal::from(80), Decimal::from(-10)),
            Decimal::from(72)
        );
        assert_eq!(
            apply_percent(Decimal::from(80), Decimal::from(50)),
            Decimal::from(120)
        );
        assert_eq!(
            percent_of(Decimal::from(80), Decimal::from(-10)),
            Decimal::from(-8)
        );
    }
}

//! Integration tests for the browse-time flash feed over the `bowling`
//! fixture set.

use jiff::{civil::date, tz::TimeZone};
use rust_decimal::Decimal;
use testresult::TestResult;

use loisir::{
    fixtures::Fixture,
    promotions::{FlashFeed, PromotionType},
};

#[test]
fn wednesday_evening_feed() -> TestResult {
    let fixture = Fixture::from_set("bowling")?;
    let now = date(2026, 10, 21).at(18, 30, 0, 0).to_zoned(TimeZone::UTC)?;

    let feed = FlashFeed::active_at(&now, fixture.repository().promotions());

    let titles: Vec<&str> = feed.iter().map(|offer| offer.title.as_str()).collect();

    assert_eq!(titles, ["Flash karting", "Afterwork"]);

    let karting = feed.first().ok_or("feed is empty")?;

    assert_eq!(karting.offer, fixture.offer("karting")?.uuid);
    assert_eq!(karting.promotion_type, PromotionType::Regular);
    assert_eq!(karting.discount_percentage, Decimal::from(30));
    assert_eq!(karting.promotional_price, Some(Decimal::new(1540, 2)));
    assert_eq!(karting.ends_at, date(2026, 10, 25).at(22, 0, 0, 0));

    let afterwork = feed.get(1).ok_or("afterwork missing")?;

    assert_eq!(
        afterwork.ends_at,
        date(2026, 10, 21).at(20, 0, 59, 999_999_999)
    );

    Ok(())
}

#[test]
fn inactive_and_future_promotions_are_hidden() -> TestResult {
    let fixture = Fixture::from_set("bowling")?;

    // Thursday lunchtime: "Midi malin" would run but is inactive.
    let now = date(2026, 10, 22).at(12, 30, 0, 0).to_zoned(TimeZone::UTC)?;

    let feed = FlashFeed::active_at(&now, fixture.repository().promotions());

    let titles: Vec<&str> = feed.iter().map(|offer| offer.title.as_str()).collect();

    assert_eq!(titles, ["Flash karting"]);

    Ok(())
}

//! Loisir quote CLI
//!
//! Prices bookings against a YAML fixture set.

use std::{io, path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use jiff::{
    Timestamp,
    civil::{Date, Time},
};
use loisir::{
    discovery::{ActivitySignals, GeoPoint, rank},
    fixtures::Fixture,
    pricing::{DynamicPricing, PricingRequest, SimplePricing, SimplePricingRequest},
    promotions::FlashFeed,
    receipt::{write_calculation, write_feed, write_quote},
    repository::{OfferListing, PricingRepository},
    schedule::parse_clock,
    uuids::{OfferUuid, OptionUuid},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "loisir-quote", about = "Price leisure bookings from fixtures", long_about = None)]
struct Cli {
    /// Directory holding the `offers/`, `rules/` and `promotions/` fixture folders
    #[arg(long, env = "LOISIR_FIXTURES", default_value = "./fixtures")]
    fixtures: PathBuf,

    /// Fixture set name
    #[arg(short, long, env = "LOISIR_SET", default_value = "bowling")]
    set: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rule and promotion based price for a booking
    Quote(QuoteArgs),

    /// Unit-based price from a pricing option
    Simple(SimpleArgs),

    /// Promotions live right now
    Feed(FeedArgs),
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Offer fixture key
    #[arg(long)]
    offer: String,

    /// Party size
    #[arg(short, long, default_value_t = 1)]
    participants: u32,

    /// Booking date, `YYYY-MM-DD`
    #[arg(long)]
    date: Option<Date>,

    /// Booking time, `HH:MM`
    #[arg(long, value_parser = parse_time)]
    time: Option<Time>,
}

#[derive(Debug, Args)]
struct SimpleArgs {
    /// Offer fixture key
    #[arg(long)]
    offer: String,

    /// Pricing option; the offer's default when omitted
    #[arg(long)]
    option: Option<OptionUuid>,

    /// Party size
    #[arg(short, long, default_value_t = 1)]
    participants: u32,

    /// Games, hours or units booked
    #[arg(short, long, default_value_t = 1)]
    units: u32,
}

#[derive(Debug, Args)]
struct FeedArgs {
    /// Instant to evaluate, RFC 3339; now when omitted
    #[arg(long)]
    at: Option<Timestamp>,

    /// Rank offers near `lat,lng`
    #[arg(long, value_parser = parse_point)]
    near: Option<GeoPoint>,

    /// Search radius in kilometres
    #[arg(long, default_value_t = 20.0)]
    radius: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let mut fixture = Fixture::with_base_path(&cli.fixtures);

    fixture
        .load_set(&cli.set)
        .with_context(|| format!("failed to load fixture set {:?}", cli.set))?;

    info!(set = %cli.set, offers = fixture.offer_keys().len(), "fixture set loaded");

    match cli.command {
        Commands::Quote(args) => quote(&fixture, &args).await,
        Commands::Simple(args) => simple(&fixture, &args).await,
        Commands::Feed(args) => feed(&fixture, &args),
    }
}

async fn quote(fixture: &Fixture, args: &QuoteArgs) -> anyhow::Result<()> {
    let offer = fixture.offer(&args.offer)?;
    let repository: Arc<dyn PricingRepository> = fixture.shared_repository();
    let engine = DynamicPricing::new(repository, fixture.config()?);

    let mut request = PricingRequest::new(offer.uuid, offer.business, args.participants);

    request.date = args.date;
    request.time = args.time;

    let Some(calculation) = engine.calculate(&request).await else {
        bail!(
            "price for {} is unavailable, see the log for details",
            args.offer
        );
    };

    write_calculation(io::stdout().lock(), &calculation)?;

    Ok(())
}

async fn simple(fixture: &Fixture, args: &SimpleArgs) -> anyhow::Result<()> {
    let offer = fixture.offer(&args.offer)?;
    let repository: Arc<dyn PricingRepository> = fixture.shared_repository();
    let engine = SimplePricing::new(repository, fixture.config()?);

    let request = SimplePricingRequest {
        offer: offer.uuid,
        option: args.option,
        participants: args.participants,
        units: args.units,
    };

    let Some(quote) = engine.calculate(&request).await else {
        bail!(
            "quote for {} is unavailable, see the log for details",
            args.offer
        );
    };

    write_quote(io::stdout().lock(), &quote)?;

    Ok(())
}

fn feed(fixture: &Fixture, args: &FeedArgs) -> anyhow::Result<()> {
    let config = fixture.config()?;
    let at = args.at.unwrap_or_else(Timestamp::now);
    let now = at.to_zoned(config.time_zone);
    let repository = fixture.repository();

    let mut live = FlashFeed::active_at(&now, repository.promotions());

    if let Some(origin) = args.near {
        let listings: Vec<&OfferListing> = repository.offers().collect();

        let ranked = rank(
            origin,
            args.radius,
            listings.iter().filter_map(|listing| {
                listing.location.map(|location| {
                    let signals = ActivitySignals {
                        location,
                        rating: listing.rating,
                        has_live_promotion: live.iter().any(|flash| flash.offer == listing.uuid),
                    };

                    (*listing, signals)
                })
            }),
        );

        let order: Vec<OfferUuid> = ranked.iter().map(|scored| scored.item.uuid).collect();

        live.retain(|flash| order.contains(&flash.offer));
        live.sort_by_key(|flash| order.iter().position(|uuid| *uuid == flash.offer));
    }

    write_feed(io::stdout().lock(), &live, |flash| {
        repository
            .offer(flash.offer)
            .map(|listing| listing.name.as_str())
    })?;

    Ok(())
}

fn parse_time(raw: &str) -> Result<Time, String> {
    parse_clock(raw).ok_or_else(|| format!("{raw:?} is not a HH:MM time"))
}

fn parse_point(raw: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("{raw:?} is not a lat,lng pair"))?;

    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("bad latitude: {err}"))?;

    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("bad longitude: {err}"))?;

    Ok(GeoPoint::new(lat, lng))
}

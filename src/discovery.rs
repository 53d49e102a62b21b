//! Discovery
//!
//! Distance and ranking helpers for browsing activities near the user.

use serde::Deserialize;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Weight of proximity in the ranking score.
pub const PROXIMITY_WEIGHT: f64 = 0.5;

/// Weight of rating in the ranking score.
pub const RATING_WEIGHT: f64 = 0.3;

/// Flat bonus for a live flash promotion.
pub const PROMOTION_BONUS: f64 = 0.2;

/// Highest rating an activity can have.
pub const MAX_RATING: f64 = 5.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,

    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Keep the items whose location lies within `radius_km` of `origin`.
pub fn within_radius<'a, T>(
    origin: GeoPoint,
    radius_km: f64,
    items: impl IntoIterator<Item = (&'a T, GeoPoint)>,
) -> Vec<(&'a T, f64)>
where
    T: 'a,
{
    items
        .into_iter()
        .map(|(item, location)| (item, haversine_km(origin, location)))
        .filter(|(_, distance)| *distance <= radius_km)
        .collect()
}

/// What the ranking knows about an activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivitySignals {
    /// Venue location.
    pub location: GeoPoint,

    /// Average rating out of 5, if rated.
    pub rating: Option<f64>,

    /// Whether a flash promotion is live for it.
    pub has_live_promotion: bool,
}

/// A scored activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityScore<'a, T> {
    /// The ranked item.
    pub item: &'a T,

    /// Distance from the search origin, in kilometres.
    pub distance_km: f64,

    /// Score between 0 and 1, higher first.
    pub score: f64,
}

/// Score one activity against a search origin and radius.
///
/// Returns `None` when the activity lies outside the radius.
pub fn score(origin: GeoPoint, radius_km: f64, signals: &ActivitySignals) -> Option<(f64, f64)> {
    let distance = haversine_km(origin, signals.location);

    if distance > radius_km {
        return None;
    }

    let proximity = if radius_km > 0.0 {
        1.0 - distance / radius_km
    } else {
        1.0
    };

    let rating = signals
        .rating
        .map_or(0.0, |rating| rating.clamp(0.0, MAX_RATING) / MAX_RATING);

    let bonus = if signals.has_live_promotion {
        PROMOTION_BONUS
    } else {
        0.0
    };

    Some((
        distance,
        PROXIMITY_WEIGHT * proximity + RATING_WEIGHT * rating + bonus,
    ))
}

/// Rank activities within `radius_km` of `origin`, best first. Ties keep input order.
pub fn rank<'a, T>(
    origin: GeoPoint,
    radius_km: f64,
    activities: impl IntoIterator<Item = (&'a T, ActivitySignals)>,
) -> Vec<ActivityScore<'a, T>>
where
    T: 'a,
{
    let mut scored: Vec<ActivityScore<'a, T>> = activities
        .into_iter()
        .filter_map(|(item, signals)| {
            score(origin, radius_km, &signals).map(|(distance_km, score)| ActivityScore {
                item,
                distance_km,
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    scored
}

//! Promotions Fixtures

use serde::Deserialize;

use crate::promotions::{FixedPromotion, RecurringPromotionRecord};

/// Promotions fixture file.
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Weekly promotions.
    #[serde(default)]
    pub recurring: Vec<RecurringPromotionRecord>,

    /// Fixed-window promotions.
    #[serde(default)]
    pub fixed: Vec<FixedPromotion>,
}

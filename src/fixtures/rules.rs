//! Rules Fixtures

use serde::Deserialize;

use crate::rules::PricingRuleRecord;

/// Rules fixture file.
#[derive(Debug, Deserialize)]
pub struct RulesFixture {
    /// Rule rows as stored.
    #[serde(default)]
    pub rules: Vec<PricingRuleRecord>,
}

//! Price Accumulator
//!
//! Folds matched rules over a seeded price, one step at a time, recording what
//! each step did.

use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::{
    money::{apply_percent, percent_of},
    rules::PricingRule,
    uuids::RuleUuid,
};

/// A rule folded into the price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRule {
    /// Rule identifier.
    pub rule: RuleUuid,

    /// Rule name.
    pub name: String,

    /// Modifier as configured.
    pub modifier: Decimal,

    /// Whether the modifier is a percentage.
    pub is_percentage: bool,

    /// How much the rule lowered the price, present only when it did.
    pub savings: Option<Decimal>,
}

/// A labelled line of the price explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownLine {
    /// Label.
    pub description: String,

    /// Signed amount.
    pub amount: Decimal,
}

impl BreakdownLine {
    /// Create a line.
    pub fn new(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// Result of folding rules over a base price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulation {
    /// Price after every step, never negative.
    pub final_price: Decimal,

    /// Applied rules in application order.
    pub applied_rules: SmallVec<[AppliedRule; 4]>,

    /// Explanation lines; the first is always the base computation.
    pub breakdown: Vec<BreakdownLine>,

    /// Sum of every step's positive saving.
    pub total_savings: Decimal,
}

/// Running state of a price calculation.
#[derive(Debug, Clone)]
pub struct Accumulator {
    price: Decimal,
    applied_rules: SmallVec<[AppliedRule; 4]>,
    breakdown: Vec<BreakdownLine>,
    total_savings: Decimal,
}

impl Accumulator {
    /// Seed with `base_price × participants`.
    pub fn seed(base_price: Decimal, participants: u32) -> Self {
        let price = base_price * Decimal::from(participants);

        Self {
            price,
            applied_rules: SmallVec::new(),
            breakdown: vec![BreakdownLine::new(
                format!("Base price ({participants} participants)"),
                price,
            )],
            total_savings: Decimal::ZERO,
        }
    }

    /// Current running price, before clamping.
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Fold one rule into the price.
    pub fn apply(&mut self, rule: &PricingRule) {
        let (delta, next) = if rule.is_percentage {
            (
                percent_of(self.price, rule.price_modifier),
                apply_percent(self.price, rule.price_modifier),
            )
        } else {
            (rule.price_modifier, self.price + rule.price_modifier)
        };

        let savings = self.step(&rule.name, delta, next);

        self.applied_rules.push(AppliedRule {
            rule: rule.uuid,
            name: rule.name.clone(),
            modifier: rule.price_modifier,
            is_percentage: rule.is_percentage,
            savings,
        });
    }

    /// Take `percent` percent off the running price as a labelled step.
    ///
    /// Returns the saving, if the step lowered the price.
    pub fn discount(&mut self, description: &str, percent: Decimal) -> Option<Decimal> {
        let delta = -percent_of(self.price, percent);
        let next = self.price + delta;

        self.step(description, delta, next)
    }

    fn step(&mut self, description: &str, delta: Decimal, next: Decimal) -> Option<Decimal> {
        let savings = self.price - next;

        self.price = next;
        self.breakdown.push(BreakdownLine::new(description, delta));

        if savings > Decimal::ZERO {
            self.total_savings += savings;

            Some(savings)
        } else {
            None
        }
    }

    /// Clamp the price at zero and hand back the result.
    pub fn finish(self) -> Accumulation {
        Accumulation {
            final_price: self.price.max(Decimal::ZERO),
            applied_rules: self.applied_rules,
            breakdown: self.breakdown,
            total_savings: self.total_savings,
        }
    }
}

/// Fold rules, in the order given, over `base_price × participants`.
pub fn apply_rules<'r>(
    base_price: Decimal,
    participants: u32,
    rules: impl IntoIterator<Item = &'r PricingRule>,
) -> Accumulation {
    let mut accumulator = Accumulator::seed(base_price, participants);

    for rule in rules {
        accumulator.apply(rule);
    }

    accumulator.finish()
}

#[cfg(test)]
mod tests {
    use crate::{rules::RuleKind, uuids::BusinessUuid};

    use super::*;

    fn rule(name: &str, modifier: i64, is_percentage: bool) -> PricingRule {
        PricingRule {
            uuid: RuleUuid::new(),
            business: BusinessUuid::new(),
            offer: None,
            name: name.to_string(),
            kind: RuleKind::ParticipantTiers { min: 0, max: 999 },
            price_modifier: Decimal::from(modifier),
            is_percentage,
            is_active: true,
            priority: 0,
        }
    }

    #[test]
    fn no_rules_multiplies_base_by_party() {
        let result = apply_rules(Decimal::from(20), 4, &Vec::<PricingRule>::new());

        assert_eq!(result.final_price, Decimal::from(80));
        assert_eq!(result.total_savings, Decimal::ZERO);
        assert_eq!(
            result.breakdown,
            [BreakdownLine::new("Base price (4 participants)", Decimal::from(80))]
        );
    }

    #[test]
    fn percentage_rule_scales_price_and_records_saving() {
        let discount = rule("Group", -10, true);
        let result = apply_rules(Decimal::from(20), 4, [&discount]);

        assert_eq!(result.final_price, Decimal::from(72));
        assert_eq!(result.total_savings, Decimal::from(8));
        assert_eq!(result.applied_rules.len(), 1);
        assert_eq!(
            result.applied_rules.first().map(|applied| applied.savings),
            Some(Some(Decimal::from(8)))
        );
        assert_eq!(
            result.breakdown.last(),
            Some(&BreakdownLine::new("Group", Decimal::from(-8)))
        );
    }

    #[test]
    fn surcharge_records_no_saving() {
        let surcharge = rule("Peak", 5, false);
        let result = apply_rules(Decimal::from(10), 2, [&surcharge]);

        assert_eq!(result.final_price, Decimal::from(25));
        assert_eq!(result.total_savings, Decimal::ZERO);
        assert_eq!(
            result.applied_rules.first().map(|applied| applied.savings),
            Some(None)
        );
    }

    #[test]
    fn absolute_rule_cannot_push_price_below_zero() {
        let huge = rule("Voucher", -50, false);
        let result = apply_rules(Decimal::from(10), 1, [&huge]);

        assert_eq!(result.final_price, Decimal::ZERO);
        assert_eq!(result.total_savings, Decimal::from(50));
    }

    #[test]
    fn savings_are_not_netted_against_later_increases() {
        let off = rule("Off peak", -20, true);
        let up = rule("Weekend", 50, true);
        let result = apply_rules(Decimal::from(100), 1, [&off, &up]);

        assert_eq!(result.final_price, Decimal::from(120));
        assert_eq!(result.total_savings, Decimal::from(20));
        assert_eq!(result.breakdown.len(), 3);
    }

    #[test]
    fn discount_step_is_labelled_and_saved() {
        let mut accumulator = Accumulator::seed(Decimal::from(50), 2);
        let saving = accumulator.discount("Happy hour (-20%)", Decimal::from(20));
        let result = accumulator.finish();

        assert_eq!(saving, Some(Decimal::from(20)));
        assert_eq!(result.final_price, Decimal::from(80));
        assert_eq!(result.total_savings, Decimal::from(20));
        assert_eq!(
            result.breakdown.last(),
            Some(&BreakdownLine::new("Happy hour (-20%)", Decimal::from(-20)))
        );
    }

    #[test]
    fn same_inputs_give_same_output() {
        let rules = [rule("a", -15, true), rule("b", 3, false)];

        assert_eq!(
            apply_rules(Decimal::from(37), 3, &rules),
            apply_rules(Decimal::from(37), 3, &rules)
        );
    }
}

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, SurchargeTerms};
use crate::decimal::Money;

/// multa and honorarios over a corrected debt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surcharges {
    /// corrected + interest, the base of both percentages
    pub base: Money,
    pub multa: Money,
    pub honorarios: Money,
    pub total: Money,
}

/// Applies penalty and legal fee percentages.
///
/// Both percentages are taken on the same base; the penalty is not folded
/// into the base of the fees.
pub struct SurchargeApplier<'a> {
    terms: SurchargeTerms,
    config: &'a EngineConfig,
}

impl<'a> SurchargeApplier<'a> {
    pub fn new(terms: SurchargeTerms, config: &'a EngineConfig) -> Self {
        Self { terms, config }
    }

    pub fn apply(&self, corrected: Money, interest: Money) -> Surcharges {
        let base = corrected + interest;
        let multa = self.config.money(base.percentage(self.terms.multa_percent));
        let honorarios = self.config.money(base.percentage(self.terms.honorarios_percent));

        Surcharges {
            base,
            multa,
            honorarios,
            total: base + multa + honorarios,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;

    #[test]
    fn test_multa_and_honorarios_share_base() {
        let config = EngineConfig::default();
        let terms = SurchargeTerms::new(Rate::from_percentage(10), Rate::from_percentage(10));
        let applied = SurchargeApplier::new(terms, &config)
            .apply(Money::from_minor(112_683), Money::from_minor(12_000));

        assert_eq!(applied.base, Money::from_minor(124_683));
        assert_eq!(applied.multa, Money::from_minor(12_468));
        assert_eq!(applied.honorarios, Money::from_minor(12_468));
        assert_eq!(applied.total, Money::from_minor(149_619));
    }

    #[test]
    fn test_zero_percentages_add_nothing() {
        let config = EngineConfig::default();
        let applied = SurchargeApplier::new(SurchargeTerms::default(), &config)
            .apply(Money::from_major(1_000), Money::from_major(50));

        assert!(applied.multa.is_zero());
        assert!(applied.honorarios.is_zero());
        assert_eq!(applied.total, Money::from_major(1_050));
    }
}

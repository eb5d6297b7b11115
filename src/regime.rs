use rust_decimal::Decimal;

use crate::config::InterestTerms;
use crate::decimal::Rate;
use crate::errors::Result;
use crate::index::{IndexSeries, IndexSource};
use crate::legislation::{CorrectionRule, LegislativeRuleTable};
use crate::types::{Competence, IndexTableId};

/// where the correction of one month comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorrectionSource {
    /// no correction, factor 1
    None,
    Table(IndexTableId),
    /// `index` plus a monthly premium, bounded by `cap`
    CappedPremium {
        index: IndexTableId,
        monthly_premium: Rate,
        cap: IndexTableId,
    },
}

/// correction and interest rule in force for one competence
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRegime {
    pub correction: CorrectionSource,
    /// simple interest accrued in this month, legislated mode only
    pub monthly_interest: Option<Rate>,
    /// legal basis of the month, if any
    pub era: Option<String>,
}

/// how interest is computed over an installment's window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterestModel {
    /// user supplied rate, type and periodicity
    Contractual(InterestTerms),
    /// sum of the monthly rates dictated by each month's regime
    Legislated { on_corrected_value: bool },
}

/// Selects the correction and interest rules applied to each month.
///
/// The calculation mode is turned into one strategy up front; the
/// accumulator and resolver only talk to this trait.
pub trait RegimeStrategy {
    fn interest_model(&self) -> InterestModel;

    fn regime_for(&self, competence: Competence) -> Result<MonthlyRegime>;
}

/// user chosen index table (or none) and contractual interest
#[derive(Debug, Clone)]
pub struct StandardRegime {
    pub table: Option<IndexTableId>,
    pub terms: InterestTerms,
}

impl StandardRegime {
    pub fn new(table: Option<IndexTableId>, terms: InterestTerms) -> Self {
        Self { table, terms }
    }
}

impl RegimeStrategy for StandardRegime {
    fn interest_model(&self) -> InterestModel {
        InterestModel::Contractual(self.terms)
    }

    fn regime_for(&self, _competence: Competence) -> Result<MonthlyRegime> {
        Ok(MonthlyRegime {
            correction: match self.table {
                Some(id) => CorrectionSource::Table(id),
                None => CorrectionSource::None,
            },
            monthly_interest: None,
            era: None,
        })
    }
}

/// month by month rules of the legislative table
pub struct PublicTreasuryRegime<'a> {
    rules: &'a LegislativeRuleTable,
    series: IndexSeries<'a>,
    on_corrected_value: bool,
}

impl<'a> PublicTreasuryRegime<'a> {
    pub fn new(
        rules: &'a LegislativeRuleTable,
        source: &'a dyn IndexSource,
        on_corrected_value: bool,
    ) -> Self {
        Self {
            rules,
            series: IndexSeries::new(source),
            on_corrected_value,
        }
    }
}

impl<'a> RegimeStrategy for PublicTreasuryRegime<'a> {
    fn interest_model(&self) -> InterestModel {
        InterestModel::Legislated {
            on_corrected_value: self.on_corrected_value,
        }
    }

    fn regime_for(&self, competence: Competence) -> Result<MonthlyRegime> {
        let era = self.rules.era_for_competence(competence)?;

        let (correction, monthly_interest) = match &era.correction {
            CorrectionRule::Index(name) => (
                CorrectionSource::Table(self.series.find_table(name)?.id),
                era.interest.monthly_rate(),
            ),
            CorrectionRule::CappedPremium {
                index,
                annual_premium,
                cap,
            } => {
                let monthly_premium = annual_premium.monthly_share();
                (
                    CorrectionSource::CappedPremium {
                        index: self.series.find_table(index)?.id,
                        monthly_premium,
                        cap: self.series.find_table(cap)?.id,
                    },
                    Some(monthly_premium),
                )
            }
        };

        Ok(MonthlyRegime {
            correction,
            monthly_interest,
            era: Some(era.label.clone()),
        })
    }
}

/// Replaces the correction table of another strategy, keeping its interest rules.
pub struct OverriddenRegime<'a> {
    inner: &'a dyn RegimeStrategy,
    table: IndexTableId,
}

impl<'a> OverriddenRegime<'a> {
    pub fn new(inner: &'a dyn RegimeStrategy, table: IndexTableId) -> Self {
        Self { inner, table }
    }
}

impl<'a> RegimeStrategy for OverriddenRegime<'a> {
    fn interest_model(&self) -> InterestModel {
        self.inner.interest_model()
    }

    fn regime_for(&self, competence: Competence) -> Result<MonthlyRegime> {
        let inner = self.inner.regime_for(competence)?;
        Ok(MonthlyRegime {
            correction: CorrectionSource::Table(self.table),
            ..inner
        })
    }
}

/// Effective correction of a capped month: the index variation plus the
/// premium unless that exceeds the cap's variation, in which case the cap
/// alone applies and no premium accrues.
pub(crate) fn apply_cap(index_variation: Decimal, premium: Rate, cap_variation: Decimal) -> (Decimal, Rate, bool) {
    if index_variation + premium.as_fraction() > cap_variation {
        (cap_variation, Rate::ZERO, true)
    } else {
        (index_variation, premium, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CorrectionError;
    use crate::fixtures;
    use rust_decimal_macros::dec;

    #[test]
    fn test_standard_regime_is_constant() {
        let id = uuid::Uuid::new_v4();
        let regime = StandardRegime::new(Some(id), InterestTerms::civil_code_default());
        let month = regime.regime_for(Competence::new(1970, 1).unwrap()).unwrap();

        assert_eq!(month.correction, CorrectionSource::Table(id));
        assert_eq!(month.monthly_interest, None);
        assert!(matches!(regime.interest_model(), InterestModel::Contractual(_)));

        let bare = StandardRegime::new(None, InterestTerms::none());
        assert_eq!(
            bare.regime_for(Competence::new(2024, 1).unwrap()).unwrap().correction,
            CorrectionSource::None
        );
    }

    #[test]
    fn test_public_treasury_switches_table_at_ec_113() {
        let store = fixtures::treasury_store();
        let rules = LegislativeRuleTable::federal_public_treasury();
        let regime = PublicTreasuryRegime::new(&rules, &store, true);

        let november = regime.regime_for(Competence::new(2021, 11).unwrap()).unwrap();
        let december = regime.regime_for(Competence::new(2021, 12).unwrap()).unwrap();

        let ipca_e = store.find_table("IPCA-E").unwrap().id;
        let selic = store.find_table("SELIC").unwrap().id;
        assert_eq!(november.correction, CorrectionSource::Table(ipca_e));
        assert_eq!(november.monthly_interest, Some(Rate::from_percent(dec!(0.5))));
        assert_eq!(december.correction, CorrectionSource::Table(selic));
        assert_eq!(december.monthly_interest, None);
        assert_eq!(december.era.as_deref(), Some("EC 113/2021"));
    }

    #[test]
    fn test_public_treasury_capped_era() {
        let store = fixtures::treasury_store();
        let rules = LegislativeRuleTable::federal_public_treasury();
        let regime = PublicTreasuryRegime::new(&rules, &store, true);

        let month = regime.regime_for(Competence::new(2025, 11).unwrap()).unwrap();
        match month.correction {
            CorrectionSource::CappedPremium { monthly_premium, .. } => {
                assert_eq!(monthly_premium, Rate::from_percentage(2).monthly_share());
            }
            other => panic!("expected capped premium, got {:?}", other),
        }
    }

    #[test]
    fn test_public_treasury_requires_era_tables() {
        let store = crate::index::IndexStore::new();
        let rules = LegislativeRuleTable::federal_public_treasury();
        let regime = PublicTreasuryRegime::new(&rules, &store, true);

        let err = regime.regime_for(Competence::new(2015, 3).unwrap()).unwrap_err();
        assert_eq!(
            err,
            CorrectionError::UnknownIndexTable {
                reference: "IPCA-E".to_string()
            }
        );

        let err = regime.regime_for(Competence::new(1980, 3).unwrap()).unwrap_err();
        assert!(matches!(err, CorrectionError::UnknownEra { .. }));
    }

    #[test]
    fn test_override_keeps_interest_rule() {
        let store = fixtures::treasury_store();
        let rules = LegislativeRuleTable::federal_public_treasury();
        let regime = PublicTreasuryRegime::new(&rules, &store, false);
        let inpc = store.find_table("INPC").unwrap().id;
        let overridden = OverriddenRegime::new(&regime, inpc);

        let month = overridden.regime_for(Competence::new(2015, 3).unwrap()).unwrap();
        assert_eq!(month.correction, CorrectionSource::Table(inpc));
        assert_eq!(month.monthly_interest, Some(Rate::from_percent(dec!(0.5))));
        assert_eq!(
            overridden.interest_model(),
            InterestModel::Legislated {
                on_corrected_value: false
            }
        );
    }

    #[test]
    fn test_apply_cap() {
        let premium = Rate::from_percentage(2).monthly_share();

        let (variation, interest, capped) = apply_cap(dec!(0.003), premium, dec!(0.008));
        assert_eq!((variation, interest, capped), (dec!(0.003), premium, false));

        let (variation, interest, capped) = apply_cap(dec!(0.003), premium, dec!(0.004));
        assert_eq!((variation, interest, capped), (dec!(0.004), Rate::ZERO, true));
    }
}

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::correction::{AccumulatedPeriod, PeriodAccumulator};
use crate::decimal::Money;
use crate::errors::{CorrectionError, Result};
use crate::index::{IndexSeries, IndexSource};
use crate::interest::{contractual_interest, simple_from_monthly_rates};
use crate::regime::{InterestModel, OverriddenRegime, RegimeStrategy};
use crate::result::InstallmentResult;
use crate::types::{Competence, IndexTableId};

/// a partial debt with its own due date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub description: String,
    pub original_value: Money,
    pub due_date: NaiveDate,
    /// correction table replacing the mode's default for this installment
    #[serde(default)]
    pub index_table: Option<IndexTableId>,
}

impl Installment {
    pub fn new(description: &str, original_value: Money, due_date: NaiveDate) -> Self {
        Self {
            description: description.to_string(),
            original_value,
            due_date,
            index_table: None,
        }
    }

    pub fn with_index_table(mut self, table: IndexTableId) -> Self {
        self.index_table = Some(table);
        self
    }
}

/// values of an installment as if the calculation ended at the close of a month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthPartial {
    pub corrected: Money,
    pub interest: Money,
}

/// installment result plus the month by month values behind it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInstallment {
    pub result: InstallmentResult,
    pub partials: BTreeMap<Competence, MonthPartial>,
}

impl ResolvedInstallment {
    /// Contribution of the installment to a month of the evolution report.
    ///
    /// Months before the first touched one contribute nothing; months after
    /// the last touched one carry the final values.
    pub fn partial_at(&self, competence: Competence, window_end: NaiveDate) -> MonthPartial {
        if let Some(partial) = self.partials.get(&competence) {
            return *partial;
        }
        let started = match self.partials.keys().next() {
            Some(first) => competence > *first,
            None => !self.result.not_yet_due && self.result.due_date <= window_end,
        };
        if started {
            MonthPartial {
                corrected: self.result.corrected_value,
                interest: self.result.interest_value,
            }
        } else {
            MonthPartial {
                corrected: Money::ZERO,
                interest: Money::ZERO,
            }
        }
    }
}

/// Corrects and accrues interest on each installment over `[due_date, end]`.
pub struct InstallmentResolver<'a> {
    series: IndexSeries<'a>,
    accumulator: PeriodAccumulator<'a>,
    config: &'a EngineConfig,
}

impl<'a> InstallmentResolver<'a> {
    pub fn new(source: &'a dyn IndexSource, config: &'a EngineConfig) -> Self {
        Self {
            series: IndexSeries::new(source),
            accumulator: PeriodAccumulator::new(source),
            config,
        }
    }

    pub fn resolve(
        &self,
        installment: &Installment,
        strategy: &dyn RegimeStrategy,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<ResolvedInstallment> {
        if installment.due_date < start_date {
            return Err(CorrectionError::InvalidRange {
                message: format!(
                    "due date {} precedes the start date {}",
                    installment.due_date, start_date
                ),
            });
        }

        if installment.due_date > end_date {
            warn!(
                description = %installment.description,
                due_date = %installment.due_date,
                "installment not yet due"
            );
            return Ok(ResolvedInstallment {
                result: InstallmentResult::not_yet_due(
                    &installment.description,
                    installment.original_value,
                    installment.due_date,
                ),
                partials: BTreeMap::new(),
            });
        }

        // the override is validated before any arithmetic
        let overridden;
        let strategy: &dyn RegimeStrategy = match installment.index_table {
            Some(id) => {
                self.series.table(id)?;
                overridden = OverriddenRegime::new(strategy, id);
                &overridden
            }
            None => strategy,
        };

        let period = self
            .accumulator
            .accumulate(strategy, installment.due_date, end_date)?;
        let original = installment.original_value.as_decimal();
        let model = strategy.interest_model();

        let (interest, interest_periods) =
            self.interest_through(&model, installment, &period, period.months.len(), end_date)?;
        let corrected = scale(original, period.factor)?;

        let mut partials = BTreeMap::new();
        for (k, month) in period.months.iter().enumerate() {
            let window_end = end_date.min(month.competence.next().first_day());
            let (interest_k, _) = self.interest_through(&model, installment, &period, k + 1, window_end)?;
            partials.insert(
                month.competence,
                MonthPartial {
                    corrected: self.config.money(scale(original, month.factor)?),
                    interest: self.config.money(interest_k),
                },
            );
        }

        let corrected_value = self.config.money(corrected);
        let interest_value = self.config.money(interest);
        let subtotal = corrected_value.checked_add(interest_value).ok_or_else(|| {
            CorrectionError::CalculationOverflow {
                message: format!("subtotal of {}", installment.description),
            }
        })?;

        debug!(
            description = %installment.description,
            factor = %period.factor,
            %corrected_value,
            %interest_value,
            "installment resolved"
        );

        Ok(ResolvedInstallment {
            result: InstallmentResult {
                description: installment.description.clone(),
                original_value: installment.original_value,
                due_date: installment.due_date,
                applied_index_name: period.applied_index_name(),
                correction_factor: period.factor,
                corrected_value,
                interest_value,
                subtotal,
                interest_periods,
                not_yet_due: false,
            },
            partials,
        })
    }

    /// Interest accrued over the first `months` months of the period, the
    /// window closing at `window_end`.
    fn interest_through(
        &self,
        model: &InterestModel,
        installment: &Installment,
        period: &AccumulatedPeriod,
        months: usize,
        window_end: NaiveDate,
    ) -> Result<(Decimal, u32)> {
        let original = installment.original_value.as_decimal();
        let factor = match months {
            0 => Decimal::ONE,
            k => period.months[k - 1].factor,
        };

        match model {
            InterestModel::Contractual(terms) => {
                let base = if terms.on_corrected_value {
                    scale(original, factor)?
                } else {
                    original
                };
                let calc = contractual_interest(terms, base, installment.due_date, window_end)?;
                Ok((calc.interest, calc.periods))
            }
            InterestModel::Legislated { on_corrected_value } => {
                let base = if *on_corrected_value {
                    scale(original, factor)?
                } else {
                    original
                };
                let rates: Vec<_> = period.monthly_interest_rates().take(months).collect();
                let accruing = rates.iter().filter(|r| !r.is_zero()).count() as u32;
                Ok((simple_from_monthly_rates(base, rates)?, accruing))
            }
        }
    }
}

fn scale(value: Decimal, factor: Decimal) -> Result<Decimal> {
    value
        .checked_mul(factor)
        .ok_or_else(|| CorrectionError::CalculationOverflow {
            message: format!("{} corrected by factor {}", value, factor),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InterestTerms;
    use crate::fixtures::{self, competence, date};
    use crate::legislation::LegislativeRuleTable;
    use crate::regime::{PublicTreasuryRegime, StandardRegime};
    use crate::types::{IndexKind, Provenance};
    use rust_decimal_macros::dec;

    #[test]
    fn test_one_percent_installment_over_a_year() {
        let (store, id) = fixtures::flat_store("TEST", dec!(1));
        let config = EngineConfig::default();
        let resolver = InstallmentResolver::new(&store, &config);
        let regime = StandardRegime::new(Some(id), InterestTerms::civil_code_default());

        let installment = Installment::new("principal", Money::from_major(1_000), date(2024, 1, 1));
        let resolved = resolver
            .resolve(&installment, &regime, date(2024, 1, 1), date(2025, 1, 1))
            .unwrap();

        assert_eq!(resolved.result.corrected_value, Money::from_minor(112_683));
        assert_eq!(resolved.result.interest_value, Money::from_minor(13_522));
        assert_eq!(resolved.result.interest_periods, 12);
        assert_eq!(resolved.partials.len(), 12);

        let last = resolved.partials[&competence(2024, 12)];
        assert_eq!(last.corrected, resolved.result.corrected_value);
        assert_eq!(last.interest, resolved.result.interest_value);

        // one month in: 1010.00 corrected, 1% on it
        let first = resolved.partials[&competence(2024, 1)];
        assert_eq!(first.corrected, Money::from_major(1_010));
        assert_eq!(first.interest, Money::from_minor(1_010));
    }

    #[test]
    fn test_interest_on_original_value() {
        let (store, id) = fixtures::flat_store("TEST", dec!(1));
        let config = EngineConfig::default();
        let resolver = InstallmentResolver::new(&store, &config);
        let terms = InterestTerms {
            on_corrected_value: false,
            ..InterestTerms::civil_code_default()
        };
        let regime = StandardRegime::new(Some(id), terms);

        let installment = Installment::new("principal", Money::from_major(1_000), date(2024, 1, 1));
        let resolved = resolver
            .resolve(&installment, &regime, date(2024, 1, 1), date(2025, 1, 1))
            .unwrap();

        assert_eq!(resolved.result.interest_value, Money::from_major(120));
    }

    #[test]
    fn test_future_installment_contributes_nothing() {
        let (store, id) = fixtures::flat_store("TEST", dec!(1));
        let config = EngineConfig::default();
        let resolver = InstallmentResolver::new(&store, &config);
        let regime = StandardRegime::new(Some(id), InterestTerms::civil_code_default());

        let installment = Installment::new("parcela 12", Money::from_major(500), date(2025, 6, 1));
        let resolved = resolver
            .resolve(&installment, &regime, date(2024, 1, 1), date(2025, 1, 1))
            .unwrap();

        assert!(resolved.result.not_yet_due);
        assert!(resolved.result.subtotal.is_zero());
        assert_eq!(
            resolved.partial_at(competence(2025, 6), date(2025, 7, 1)).corrected,
            Money::ZERO
        );
    }

    #[test]
    fn test_due_before_start_is_rejected() {
        let (store, id) = fixtures::flat_store("TEST", dec!(1));
        let config = EngineConfig::default();
        let resolver = InstallmentResolver::new(&store, &config);
        let regime = StandardRegime::new(Some(id), InterestTerms::none());

        let installment = Installment::new("parcela 0", Money::from_major(500), date(2023, 12, 1));
        let err = resolver
            .resolve(&installment, &regime, date(2024, 1, 1), date(2025, 1, 1))
            .unwrap_err();
        assert!(matches!(err, CorrectionError::InvalidRange { .. }));
    }

    #[test]
    fn test_override_table_wins() {
        let (mut store, base) = fixtures::flat_store("BASE", dec!(1));
        let other = store
            .create_table("OTHER", "", IndexKind::MonthlyRate, Provenance::Manual)
            .unwrap();
        fixtures::publish_flat(&mut store, other, dec!(2), competence(2024, 1), competence(2024, 12));

        let config = EngineConfig::default();
        let resolver = InstallmentResolver::new(&store, &config);
        let regime = StandardRegime::new(Some(base), InterestTerms::none());

        let installment =
            Installment::new("parcela", Money::from_major(1_000), date(2024, 1, 1)).with_index_table(other);
        let resolved = resolver
            .resolve(&installment, &regime, date(2024, 1, 1), date(2024, 3, 1))
            .unwrap();

        assert_eq!(resolved.result.applied_index_name.as_deref(), Some("OTHER"));
        assert_eq!(resolved.result.correction_factor, dec!(1.0404));

        let missing = Installment::new("parcela", Money::from_major(1), date(2024, 1, 1))
            .with_index_table(uuid::Uuid::new_v4());
        let err = resolver
            .resolve(&missing, &regime, date(2024, 1, 1), date(2024, 3, 1))
            .unwrap_err();
        assert!(matches!(err, CorrectionError::UnknownIndexTable { .. }));
    }

    #[test]
    fn test_overflowing_correction_is_an_error() {
        let (store, id) = fixtures::flat_store("TEST", dec!(1));
        let config = EngineConfig::default();
        let resolver = InstallmentResolver::new(&store, &config);
        let regime = StandardRegime::new(Some(id), InterestTerms::civil_code_default());

        let installment = Installment::new(
            "principal",
            Money::from_decimal(dec!(70000000000000000000000000000)),
            date(2020, 1, 1),
        );
        let err = resolver
            .resolve(&installment, &regime, date(2020, 1, 1), date(2025, 1, 1))
            .unwrap_err();
        assert!(matches!(err, CorrectionError::CalculationOverflow { .. }));
    }

    #[test]
    fn test_legislated_interest_sums_era_rates() {
        let store = fixtures::treasury_store();
        let rules = LegislativeRuleTable::federal_public_treasury();
        let config = EngineConfig::default();
        let resolver = InstallmentResolver::new(&store, &config);
        let regime = PublicTreasuryRegime::new(&rules, &store, true);

        let installment = Installment::new("principal", Money::from_major(10_000), date(2021, 6, 1));
        let resolved = resolver
            .resolve(&installment, &regime, date(2021, 6, 1), date(2022, 6, 1))
            .unwrap();

        // six IPCA-E months at 0.5% interest, then SELIC with interest folded in
        let factor = resolved.result.correction_factor;
        assert_eq!(resolved.result.interest_periods, 6);
        assert_eq!(
            resolved.result.interest_value,
            config.money(dec!(10000) * factor * dec!(0.03))
        );
        assert_eq!(resolved.result.applied_index_name.as_deref(), Some("IPCA-E / SELIC"));
    }
}

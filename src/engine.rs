use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::correction::PeriodAccumulator;
use crate::decimal::Money;
use crate::errors::{CorrectionError, Result};
use crate::events::{Event, EventStore};
use crate::index::{IndexSeries, IndexSource};
use crate::installments::{InstallmentResolver, ResolvedInstallment};
use crate::legislation::LegislativeRuleTable;
use crate::regime::{PublicTreasuryRegime, RegimeStrategy, StandardRegime};
use crate::report::EvolutionReportBuilder;
use crate::request::CalculationRequest;
use crate::result::CalculationResult;
use crate::surcharge::SurchargeApplier;
use crate::types::CalculationMode;

/// Monetary correction and interest engine.
///
/// Borrows an index snapshot and a legislative table; holds no other state,
/// so one engine can serve any number of calculations concurrently.
pub struct CalculationEngine<'a> {
    index: &'a dyn IndexSource,
    rules: &'a LegislativeRuleTable,
    config: EngineConfig,
}

impl<'a> CalculationEngine<'a> {
    pub fn new(index: &'a dyn IndexSource, rules: &'a LegislativeRuleTable) -> Self {
        Self {
            index,
            rules,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResult> {
        request.validate()?;

        let mut events = EventStore::new();
        let installments = request.effective_installments();

        info!(
            mode = ?request.mode,
            start = %request.start_date,
            end = %request.end_date,
            installments = installments.len(),
            "calculation started"
        );
        events.emit(Event::CalculationStarted {
            mode: request.mode,
            start_date: request.start_date,
            end_date: request.end_date,
            installments: installments.len(),
        });

        let strategy = self.strategy_for(request)?;

        let resolver = InstallmentResolver::new(self.index, &self.config);
        let mut resolved: Vec<ResolvedInstallment> = Vec::with_capacity(installments.len());
        for (index, installment) in installments.iter().enumerate() {
            let outcome = resolver
                .resolve(installment, strategy.as_ref(), request.start_date, request.end_date)
                .map_err(|e| {
                    if request.installments.is_empty() {
                        e
                    } else {
                        e.in_installment(index, &installment.description)
                    }
                })?;

            if outcome.result.not_yet_due {
                events.emit(Event::InstallmentNotYetDue {
                    index,
                    description: installment.description.clone(),
                    due_date: installment.due_date,
                });
            } else {
                events.emit(Event::InstallmentResolved {
                    index,
                    description: installment.description.clone(),
                    applied_index_name: outcome.result.applied_index_name.clone(),
                    correction_factor: outcome.result.correction_factor,
                    corrected_value: outcome.result.corrected_value,
                    interest_value: outcome.result.interest_value,
                });
            }
            resolved.push(outcome);
        }

        let corrected_value = checked_sum(resolved.iter().map(|r| r.result.corrected_value), "corrected values")?;
        let interest_value = checked_sum(resolved.iter().map(|r| r.result.interest_value), "interest values")?;
        let original_value = if request.installments.is_empty() {
            request.principal
        } else {
            checked_sum(request.installments.iter().map(|i| i.original_value), "original values")?
        };

        let period = PeriodAccumulator::new(self.index).accumulate(
            strategy.as_ref(),
            request.start_date,
            request.end_date,
        )?;
        let monthly_breakdown = EvolutionReportBuilder::new(&period, request.end_date).build(&resolved);

        for pair in monthly_breakdown.windows(2) {
            if pair[1].index_changed {
                debug!(
                    competence = %pair[1].competence,
                    from = %pair[0].applied_index_name,
                    to = %pair[1].applied_index_name,
                    "applied index changed"
                );
                events.emit(Event::IndexChanged {
                    competence: pair[1].competence,
                    from: pair[0].applied_index_name.clone(),
                    to: pair[1].applied_index_name.clone(),
                });
            }
        }

        let surcharges =
            SurchargeApplier::new(request.surcharges, &self.config).apply(corrected_value, interest_value);
        if !surcharges.multa.is_zero() || !surcharges.honorarios.is_zero() {
            events.emit(Event::SurchargesApplied {
                base: surcharges.base,
                multa: surcharges.multa,
                honorarios: surcharges.honorarios,
            });
        }

        let total_period_variation_percent = (period.factor - Decimal::ONE)
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| CorrectionError::CalculationOverflow {
                message: format!("variation of factor {}", period.factor),
            })?;

        info!(
            %corrected_value,
            %interest_value,
            total = %surcharges.total,
            factor = %period.factor,
            "calculation completed"
        );
        events.emit(Event::CalculationCompleted {
            corrected_value,
            interest_value,
            total_value: surcharges.total,
        });

        Ok(CalculationResult {
            title: request.title.clone(),
            mode: request.mode,
            start_date: request.start_date,
            end_date: request.end_date,
            original_value,
            corrected_value,
            interest_value,
            multa_value: surcharges.multa,
            honorarios_value: surcharges.honorarios,
            total_value: surcharges.total,
            correction_factor: period.factor,
            total_period_variation_percent,
            monthly_breakdown,
            per_installment: resolved.into_iter().map(|r| r.result).collect(),
            events: events.take_events(),
        })
    }

    /// dispatch the calculation mode once
    fn strategy_for(&self, request: &CalculationRequest) -> Result<Box<dyn RegimeStrategy + 'a>> {
        match request.mode {
            CalculationMode::Standard => {
                if let Some(id) = request.index_table {
                    IndexSeries::new(self.index).table(id)?;
                }
                Ok(Box::new(StandardRegime::new(request.index_table, request.interest)))
            }
            CalculationMode::PublicTreasury => Ok(Box::new(PublicTreasuryRegime::new(
                self.rules,
                self.index,
                request.interest.on_corrected_value,
            ))),
        }
    }
}

fn checked_sum<I: Iterator<Item = Money>>(mut values: I, what: &str) -> Result<Money> {
    values
        .try_fold(Money::ZERO, |acc, value| acc.checked_add(value))
        .ok_or_else(|| CorrectionError::CalculationOverflow {
            message: format!("sum of {}", what),
        })
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::Rate;
use crate::errors::{CorrectionError, Result};
use crate::index::{IndexSeries, IndexSource};
use crate::regime::{apply_cap, CorrectionSource, RegimeStrategy};
use crate::types::Competence;

/// label of a capped month corrected by the cap alone
pub const CAPPED_LABEL_SUFFIX: &str = "(teto)";

/// correction applied to one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthVariation {
    pub competence: Competence,
    pub index_name: String,
    /// fraction, 0.0042 for 0.42%
    pub variation: Decimal,
    /// accumulated factor through this month
    pub factor: Decimal,
    /// legislated simple interest accrued in this month
    pub monthly_interest: Rate,
    pub era: Option<String>,
}

/// compounded correction over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatedPeriod {
    pub factor: Decimal,
    pub months: Vec<MonthVariation>,
}

impl AccumulatedPeriod {
    pub fn identity() -> Self {
        Self {
            factor: Decimal::ONE,
            months: Vec::new(),
        }
    }

    /// (factor - 1) x 100
    pub fn variation_percent(&self) -> Decimal {
        (self.factor - Decimal::ONE) * Decimal::ONE_HUNDRED
    }

    pub fn monthly_interest_rates(&self) -> impl Iterator<Item = &Rate> {
        self.months.iter().map(|m| &m.monthly_interest)
    }

    /// distinct index names in order of first use, joined by " / "
    pub fn applied_index_name(&self) -> Option<String> {
        let mut names: Vec<&str> = Vec::new();
        for month in &self.months {
            if !names.contains(&month.index_name.as_str()) {
                names.push(&month.index_name);
            }
        }
        if names.is_empty() {
            None
        } else {
            Some(names.join(" / "))
        }
    }
}

/// Compounds monthly variations: F = product of (1 + r_m).
///
/// The months touched by `[from, to]` are those overlapped by the half-open
/// day interval `[from, to)`. Partial months use the full published rate.
#[derive(Clone, Copy)]
pub struct PeriodAccumulator<'a> {
    series: IndexSeries<'a>,
}

impl<'a> PeriodAccumulator<'a> {
    pub fn new(source: &'a dyn IndexSource) -> Self {
        Self {
            series: IndexSeries::new(source),
        }
    }

    pub fn accumulate(
        &self,
        strategy: &dyn RegimeStrategy,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AccumulatedPeriod> {
        let mut period = AccumulatedPeriod::identity();

        for competence in Competence::span(from, to) {
            let regime = strategy.regime_for(competence)?;

            let (index_name, variation, monthly_interest) = match regime.correction {
                CorrectionSource::None => continue,
                CorrectionSource::Table(id) => {
                    let table = self.series.table(id)?;
                    (
                        table.name.clone(),
                        self.series.monthly_variation(table, competence)?,
                        regime.monthly_interest.unwrap_or(Rate::ZERO),
                    )
                }
                CorrectionSource::CappedPremium {
                    index,
                    monthly_premium,
                    cap,
                } => {
                    let index_table = self.series.table(index)?;
                    let cap_table = self.series.table(cap)?;
                    let (variation, interest, capped) = apply_cap(
                        self.series.monthly_variation(index_table, competence)?,
                        monthly_premium,
                        self.series.monthly_variation(cap_table, competence)?,
                    );
                    let name = if capped {
                        format!("{} {}", cap_table.name, CAPPED_LABEL_SUFFIX)
                    } else {
                        format!("{} + {} a.a.", index_table.name, annual_label(monthly_premium))
                    };
                    (name, variation, interest)
                }
            };

            period.factor = period
                .factor
                .checked_mul(Decimal::ONE + variation)
                .ok_or_else(|| CorrectionError::CalculationOverflow {
                    message: format!("correction factor at {}", competence),
                })?;

            debug!(
                %competence,
                index = %index_name,
                %variation,
                factor = %period.factor,
                "month accumulated"
            );

            period.months.push(MonthVariation {
                competence,
                index_name,
                variation,
                factor: period.factor,
                monthly_interest,
                era: regime.era,
            });
        }

        Ok(period)
    }
}

fn annual_label(monthly: Rate) -> String {
    let annual = (monthly.as_percent() * Decimal::from(12)).round_dp(4).normalize();
    format!("{}%", annual)
}

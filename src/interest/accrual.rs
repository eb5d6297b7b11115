use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::decimal::Rate;
use crate::errors::{CorrectionError, Result};
use crate::interest::{InterestCalculation, InterestCalculator};
use crate::types::{whole_months_between, Periodicity};

/// whole periods between two dates in the given periodicity
pub fn elapsed_periods(periodicity: Periodicity, start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    match periodicity {
        Periodicity::Daily => (end - start).num_days() as u32,
        Periodicity::Monthly => whole_months_between(start, end),
        Periodicity::Yearly => whole_months_between(start, end) / 12,
    }
}

/// simple interest over a sequence of monthly rates: base x sum(rates)
pub fn simple_from_monthly_rates<'a, I>(base: Decimal, rates: I) -> Result<Decimal>
where
    I: IntoIterator<Item = &'a Rate>,
{
    let total: Decimal = rates.into_iter().map(|r| r.as_fraction()).sum();
    base.checked_mul(total).ok_or_else(|| CorrectionError::CalculationOverflow {
        message: format!("simple interest on {}", base),
    })
}

/// engine for simple (non-compounding) interest
pub struct AccrualEngine {
    pub periodicity: Periodicity,
}

impl AccrualEngine {
    pub fn new(periodicity: Periodicity) -> Self {
        Self { periodicity }
    }

    /// base x rate x periods
    pub fn calculate_simple_interest(&self, base: Decimal, rate: Rate, periods: u32) -> Result<Decimal> {
        base.checked_mul(rate.as_fraction())
            .and_then(|per_period| per_period.checked_mul(Decimal::from(periods)))
            .ok_or_else(|| CorrectionError::CalculationOverflow {
                message: format!("simple interest on {} over {} periods", base, periods),
            })
    }
}

impl InterestCalculator for AccrualEngine {
    fn calculate_interest(
        &self,
        base: Decimal,
        rate: Rate,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<InterestCalculation> {
        let periods = elapsed_periods(self.periodicity, start_date, end_date);

        Ok(InterestCalculation {
            interest: self.calculate_simple_interest(base, rate, periods)?,
            base,
            rate,
            periods,
            method: format!("simple {:?}", self.periodicity).to_lowercase(),
        })
    }

    fn periodicity(&self) -> Periodicity {
        self.periodicity
    }
}

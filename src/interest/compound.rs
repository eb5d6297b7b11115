use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};

use crate::decimal::Rate;
use crate::errors::{CorrectionError, Result};
use crate::interest::accrual::elapsed_periods;
use crate::interest::{InterestCalculation, InterestCalculator};
use crate::types::Periodicity;

/// (1 + rate)^periods
pub fn compound_factor(rate: Rate, periods: u32) -> Result<Decimal> {
    (Decimal::ONE + rate.as_fraction())
        .checked_powi(i64::from(periods))
        .ok_or_else(|| CorrectionError::CalculationOverflow {
            message: format!("(1 + {}) ^ {} does not fit a decimal", rate, periods),
        })
}

/// engine for compound interest
pub struct CompoundingEngine {
    pub periodicity: Periodicity,
}

impl CompoundingEngine {
    pub fn new(periodicity: Periodicity) -> Self {
        Self { periodicity }
    }

    /// base x ((1 + rate)^periods - 1)
    pub fn calculate_compound(&self, base: Decimal, rate: Rate, periods: u32) -> Result<Decimal> {
        let factor = compound_factor(rate, periods)?;
        base.checked_mul(factor - Decimal::ONE)
            .ok_or_else(|| CorrectionError::CalculationOverflow {
                message: format!("compound interest on {}", base),
            })
    }
}

impl InterestCalculator for CompoundingEngine {
    fn calculate_interest(
        &self,
        base: Decimal,
        rate: Rate,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<InterestCalculation> {
        let periods = elapsed_periods(self.periodicity, start_date, end_date);

        Ok(InterestCalculation {
            interest: self.calculate_compound(base, rate, periods)?,
            base,
            rate,
            periods,
            method: format!("compound {:?}", self.periodicity).to_lowercase(),
        })
    }

    fn periodicity(&self) -> Periodicity {
        self.periodicity
    }
}

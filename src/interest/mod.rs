pub mod accrual;
pub mod compound;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::InterestTerms;
use crate::decimal::Rate;
use crate::errors::Result;
use crate::types::{InterestType, Periodicity};

pub use accrual::{elapsed_periods, simple_from_monthly_rates, AccrualEngine};
pub use compound::{compound_factor, CompoundingEngine};

/// interest calculation result, unrounded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestCalculation {
    pub interest: Decimal,
    pub base: Decimal,
    pub rate: Rate,
    /// whole periods elapsed in the rate's periodicity
    pub periods: u32,
    pub method: String,
}

impl InterestCalculation {
    pub fn zero(base: Decimal, rate: Rate) -> Self {
        Self {
            interest: Decimal::ZERO,
            base,
            rate,
            periods: 0,
            method: "none".to_string(),
        }
    }
}

/// trait for contractual interest over a date range
pub trait InterestCalculator {
    fn calculate_interest(
        &self,
        base: Decimal,
        rate: Rate,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<InterestCalculation>;

    fn periodicity(&self) -> Periodicity;
}

/// calculator matching the compounding type of the terms
pub fn calculator_for(terms: &InterestTerms) -> Box<dyn InterestCalculator> {
    match terms.interest_type {
        InterestType::Simple => Box::new(AccrualEngine::new(terms.periodicity)),
        InterestType::Compound => Box::new(CompoundingEngine::new(terms.periodicity)),
    }
}

/// interest due under the terms on `base` between two dates
pub fn contractual_interest(
    terms: &InterestTerms,
    base: Decimal,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<InterestCalculation> {
    if terms.rate.is_zero() {
        return Ok(InterestCalculation::zero(base, terms.rate));
    }
    calculator_for(terms).calculate_interest(base, terms.rate, start_date, end_date)
}

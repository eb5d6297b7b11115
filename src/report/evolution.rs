use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::correction::AccumulatedPeriod;
use crate::decimal::Money;
use crate::installments::ResolvedInstallment;
use crate::result::MonthEntry;

/// Month by month evolution of a calculation.
///
/// Rows follow the calculation-level correction; the partial values of a row
/// are the sums of the installments' values had the calculation ended at the
/// close of that month, so the last row matches the final totals. No
/// rounding happens here.
pub struct EvolutionReportBuilder<'a> {
    period: &'a AccumulatedPeriod,
    end_date: NaiveDate,
}

impl<'a> EvolutionReportBuilder<'a> {
    pub fn new(period: &'a AccumulatedPeriod, end_date: NaiveDate) -> Self {
        Self { period, end_date }
    }

    pub fn build(&self, installments: &[ResolvedInstallment]) -> Vec<MonthEntry> {
        let mut entries: Vec<MonthEntry> = Vec::with_capacity(self.period.months.len());

        for month in &self.period.months {
            let window_end = self.end_date.min(month.competence.next().first_day());

            let (corrected, interest) = installments
                .iter()
                .map(|i| i.partial_at(month.competence, window_end))
                .fold((Money::ZERO, Money::ZERO), |(c, i), p| (c + p.corrected, i + p.interest));

            let index_changed = entries
                .last()
                .map_or(false, |previous| previous.applied_index_name != month.index_name);

            entries.push(MonthEntry {
                competence: month.competence,
                applied_index_name: month.index_name.clone(),
                variation_percent: month.variation * Decimal::ONE_HUNDRED,
                accumulated_factor: month.factor,
                partial_corrected_value: corrected,
                partial_interest_value: interest,
                partial_subtotal: corrected + interest,
                index_changed,
            });
        }

        entries
    }
}

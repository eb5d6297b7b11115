//! serializable views of a calculation for report renderers
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::result::{CalculationResult, InstallmentResult, MonthEntry};
use crate::types::{CalculationMode, Competence};

/// flat view of a calculation for printing or exporting
#[derive(Debug, Serialize, Deserialize)]
pub struct EvolutionReport {
    pub title: Option<String>,
    pub mode: CalculationMode,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub correction_factor: Decimal,
    pub total_period_variation_percent: Decimal,
    pub totals: TotalsView,
    pub months: Vec<MonthEntry>,
    pub index_changes: Vec<IndexChangeView>,
    pub installments: Vec<InstallmentResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TotalsView {
    pub original_value: Money,
    pub corrected_value: Money,
    pub interest_value: Money,
    pub multa_value: Money,
    pub honorarios_value: Money,
    pub total_value: Money,
}

/// a month where the applied index switched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexChangeView {
    pub competence: Competence,
    pub from: String,
    pub to: String,
}

impl EvolutionReport {
    pub fn from_result(result: &CalculationResult) -> Self {
        let index_changes = result
            .monthly_breakdown
            .windows(2)
            .filter(|pair| pair[1].index_changed)
            .map(|pair| IndexChangeView {
                competence: pair[1].competence,
                from: pair[0].applied_index_name.clone(),
                to: pair[1].applied_index_name.clone(),
            })
            .collect();

        EvolutionReport {
            title: result.title.clone(),
            mode: result.mode,
            start_date: result.start_date,
            end_date: result.end_date,
            correction_factor: result.correction_factor,
            total_period_variation_percent: result.total_period_variation_percent,
            totals: TotalsView {
                original_value: result.original_value,
                corrected_value: result.corrected_value,
                interest_value: result.interest_value,
                multa_value: result.multa_value,
                honorarios_value: result.honorarios_value,
                total_value: result.total_value,
            },
            months: result.monthly_breakdown.clone(),
            index_changes,
            installments: result.per_installment.clone(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

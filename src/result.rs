use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::events::Event;
use crate::types::{CalculationMode, Competence};

/// one row of the evolution report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthEntry {
    pub competence: Competence,
    pub applied_index_name: String,
    pub variation_percent: Decimal,
    pub accumulated_factor: Decimal,
    /// corrected value if the calculation ended at the close of this month
    pub partial_corrected_value: Money,
    pub partial_interest_value: Money,
    pub partial_subtotal: Money,
    /// the applied index differs from the previous month's
    pub index_changed: bool,
}

/// outcome for one installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentResult {
    pub description: String,
    pub original_value: Money,
    pub due_date: NaiveDate,
    pub applied_index_name: Option<String>,
    pub correction_factor: Decimal,
    pub corrected_value: Money,
    pub interest_value: Money,
    pub subtotal: Money,
    pub interest_periods: u32,
    /// due after the end date, contributes nothing
    #[serde(default)]
    pub not_yet_due: bool,
}

impl InstallmentResult {
    pub fn not_yet_due(description: &str, original_value: Money, due_date: NaiveDate) -> Self {
        Self {
            description: description.to_string(),
            original_value,
            due_date,
            applied_index_name: None,
            correction_factor: Decimal::ONE,
            corrected_value: Money::ZERO,
            interest_value: Money::ZERO,
            subtotal: Money::ZERO,
            interest_periods: 0,
            not_yet_due: true,
        }
    }
}

/// Result of a calculation.
///
/// Currency figures are rounded once when emitted; `correction_factor` and
/// the per-month factors keep full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub mode: CalculationMode,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub original_value: Money,
    pub corrected_value: Money,
    pub interest_value: Money,
    #[serde(default, skip_serializing_if = "Money::is_zero")]
    pub multa_value: Money,
    #[serde(default, skip_serializing_if = "Money::is_zero")]
    pub honorarios_value: Money,
    pub total_value: Money,
    pub correction_factor: Decimal,
    pub total_period_variation_percent: Decimal,
    pub monthly_breakdown: Vec<MonthEntry>,
    pub per_installment: Vec<InstallmentResult>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl CalculationResult {
    /// entries where the applied index changed
    pub fn index_changes(&self) -> impl Iterator<Item = &MonthEntry> {
        self.monthly_breakdown.iter().filter(|m| m.index_changed)
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    /// short alias for json output
    pub fn json(&self) -> String {
        self.to_json_pretty()
    }
}

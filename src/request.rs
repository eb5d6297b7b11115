use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use serde::{Deserialize, Serialize};

use crate::config::{InterestTerms, SurchargeTerms};
use crate::decimal::{Money, Rate};
use crate::errors::{CorrectionError, Result};
use crate::installments::Installment;
use crate::types::{CalculationMode, IndexTableId, InterestType, Periodicity};

/// largest principal or installment accepted, in reais
pub const MAX_AMOUNT_MAJOR: i64 = 1_000_000_000_000_000;

/// what the caller asks the engine to compute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    #[serde(default)]
    pub title: Option<String>,
    pub principal: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub mode: CalculationMode,
    /// correction table in standard mode, ignored in public treasury mode
    #[serde(default)]
    pub index_table: Option<IndexTableId>,
    #[serde(default)]
    pub interest: InterestTerms,
    #[serde(default)]
    pub surcharges: SurchargeTerms,
    #[serde(default)]
    pub installments: Vec<Installment>,
}

impl CalculationRequest {
    pub fn builder() -> CalculationRequestBuilder {
        CalculationRequestBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.end_date < self.start_date {
            return Err(CorrectionError::InvalidRange {
                message: format!(
                    "end date {} precedes start date {}",
                    self.end_date, self.start_date
                ),
            });
        }

        let ceiling = Money::from_major(MAX_AMOUNT_MAJOR);

        if self.principal.is_negative() || self.principal > ceiling {
            return Err(CorrectionError::InvalidAmount {
                field: "principal".to_string(),
                amount: self.principal,
            });
        }

        for installment in &self.installments {
            if !installment.original_value.is_positive() || installment.original_value > ceiling {
                return Err(CorrectionError::InvalidAmount {
                    field: format!("installment {}", installment.description),
                    amount: installment.original_value,
                });
            }
        }

        if self.mode == CalculationMode::Standard {
            self.interest.validate()?;
        }
        self.surcharges.validate()?;

        Ok(())
    }

    /// Installments to resolve; the principal alone when none were given.
    pub fn effective_installments(&self) -> Vec<Installment> {
        if self.installments.is_empty() {
            vec![Installment::new("principal", self.principal, self.start_date)]
        } else {
            self.installments.clone()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let request: CalculationRequest =
            serde_json::from_str(json).map_err(|e| CorrectionError::InvalidConfiguration {
                message: format!("invalid request: {}", e),
            })?;
        Ok(request)
    }
}

/// builder for calculation requests
pub struct CalculationRequestBuilder {
    title: Option<String>,
    principal: Option<Money>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    mode: CalculationMode,
    index_table: Option<IndexTableId>,
    interest: InterestTerms,
    surcharges: SurchargeTerms,
    installments: Vec<Installment>,
    today: Option<NaiveDate>,
}

impl Default for CalculationRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculationRequestBuilder {
    pub fn new() -> Self {
        Self {
            title: None,
            principal: None,
            start_date: None,
            end_date: None,
            mode: CalculationMode::Standard,
            index_table: None,
            interest: InterestTerms::none(),
            surcharges: SurchargeTerms::default(),
            installments: Vec::new(),
            today: None,
        }
    }

    /// clock used for the default end date
    pub fn set_time(mut self, time: &SafeTimeProvider) -> Self {
        self.today = Some(time.now().date_naive());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn mode(mut self, mode: CalculationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn public_treasury(self) -> Self {
        self.mode(CalculationMode::PublicTreasury)
    }

    pub fn index_table(mut self, table: IndexTableId) -> Self {
        self.index_table = Some(table);
        self
    }

    pub fn interest(mut self, terms: InterestTerms) -> Self {
        self.interest = terms;
        self
    }

    pub fn interest_rate(mut self, rate: Rate, interest_type: InterestType, periodicity: Periodicity) -> Self {
        self.interest.rate = rate;
        self.interest.interest_type = interest_type;
        self.interest.periodicity = periodicity;
        self
    }

    pub fn interest_on_corrected_value(mut self, on_corrected: bool) -> Self {
        self.interest.on_corrected_value = on_corrected;
        self
    }

    pub fn multa(mut self, percent: Rate) -> Self {
        self.surcharges.multa_percent = percent;
        self
    }

    pub fn honorarios(mut self, percent: Rate) -> Self {
        self.surcharges.honorarios_percent = percent;
        self
    }

    pub fn installment(mut self, installment: Installment) -> Self {
        self.installments.push(installment);
        self
    }

    /// Build with the stored clock, or system time if none was set
    pub fn build(self) -> Result<CalculationRequest> {
        match self.today {
            Some(today) => self.finish(today),
            None => {
                let time = SafeTimeProvider::new(TimeSource::System);
                self.build_with_time(&time)
            }
        }
    }

    /// Build with an explicit clock
    pub fn build_with_time(self, time_provider: &SafeTimeProvider) -> Result<CalculationRequest> {
        let today = time_provider.now().date_naive();
        self.finish(today)
    }

    fn finish(self, today: NaiveDate) -> Result<CalculationRequest> {
        let principal = self.principal.ok_or(CorrectionError::InvalidConfiguration {
            message: "Principal required".to_string(),
        })?;

        let start_date = self.start_date.ok_or(CorrectionError::InvalidConfiguration {
            message: "Start date required".to_string(),
        })?;

        let request = CalculationRequest {
            title: self.title,
            principal,
            start_date,
            end_date: self.end_date.unwrap_or(today),
            mode: self.mode,
            index_table: self.index_table,
            interest: self.interest,
            surcharges: self.surcharges,
            installments: self.installments,
        };

        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::date;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()))
    }

    #[test]
    fn test_end_date_defaults_to_today() {
        let time = clock();
        let request = CalculationRequest::builder()
            .principal(Money::from_major(1_000))
            .start_date(date(2024, 1, 1))
            .set_time(&time)
            .build()
            .unwrap();

        assert_eq!(request.end_date, date(2024, 6, 15));
        assert!(request.interest.on_corrected_value);
    }

    #[test]
    fn test_end_date_follows_the_clock() {
        let time = clock();
        time.test_control().unwrap().advance(Duration::days(30));

        let request = CalculationRequest::builder()
            .principal(Money::from_major(1_000))
            .start_date(date(2024, 1, 1))
            .build_with_time(&time)
            .unwrap();

        assert_eq!(request.end_date, date(2024, 7, 15));
    }

    #[test]
    fn test_missing_fields() {
        let err = CalculationRequest::builder()
            .start_date(date(2024, 1, 1))
            .build_with_time(&clock());
        assert!(matches!(err, Err(CorrectionError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_validation() {
        let reversed = CalculationRequest::builder()
            .principal(Money::from_major(1))
            .start_date(date(2024, 2, 1))
            .end_date(date(2024, 1, 1))
            .build_with_time(&clock());
        assert!(matches!(reversed, Err(CorrectionError::InvalidRange { .. })));

        let negative = CalculationRequest::builder()
            .principal(Money::from_major(-1))
            .start_date(date(2024, 1, 1))
            .build_with_time(&clock());
        assert!(matches!(negative, Err(CorrectionError::InvalidAmount { .. })));

        let zero_installment = CalculationRequest::builder()
            .principal(Money::ZERO)
            .start_date(date(2024, 1, 1))
            .installment(Installment::new("parcela", Money::ZERO, date(2024, 2, 1)))
            .build_with_time(&clock());
        assert!(matches!(zero_installment, Err(CorrectionError::InvalidAmount { .. })));

        let huge = CalculationRequest::builder()
            .principal(Money::from_decimal(dec!(70000000000000000000000000000)))
            .start_date(date(2024, 1, 1))
            .build_with_time(&clock());
        assert!(matches!(huge, Err(CorrectionError::InvalidAmount { .. })));

        let huge_installment = CalculationRequest::builder()
            .principal(Money::ZERO)
            .start_date(date(2024, 1, 1))
            .installment(Installment::new(
                "parcela",
                Money::from_major(MAX_AMOUNT_MAJOR + 1),
                date(2024, 2, 1),
            ))
            .build_with_time(&clock());
        assert!(matches!(huge_installment, Err(CorrectionError::InvalidAmount { .. })));

        let negative_rate = CalculationRequest::builder()
            .principal(Money::from_major(1))
            .start_date(date(2024, 1, 1))
            .interest_rate(Rate::from_percent(dec!(-1)), InterestType::Simple, Periodicity::Monthly)
            .build_with_time(&clock());
        assert!(matches!(negative_rate, Err(CorrectionError::InvalidRate { .. })));
    }

    #[test]
    fn test_public_treasury_ignores_interest_terms() {
        let request = CalculationRequest::builder()
            .principal(Money::from_major(1))
            .start_date(date(2024, 1, 1))
            .public_treasury()
            .interest_rate(Rate::from_percent(dec!(-1)), InterestType::Compound, Periodicity::Daily)
            .build_with_time(&clock());
        assert!(request.is_ok());
    }

    #[test]
    fn test_principal_becomes_implicit_installment() {
        let request = CalculationRequest::builder()
            .principal(Money::from_major(700))
            .start_date(date(2024, 1, 10))
            .build_with_time(&clock())
            .unwrap();

        let installments = request.effective_installments();
        assert_eq!(installments.len(), 1);
        assert_eq!(installments[0].due_date, date(2024, 1, 10));
        assert_eq!(installments[0].original_value, Money::from_major(700));
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "principal": "1000.00",
            "start_date": "2024-01-01",
            "end_date": "2025-01-01",
            "interest": {
                "interest_type": "Simple",
                "rate": "1",
                "periodicity": "Monthly",
                "on_corrected_value": true
            }
        }"#;
        let request = CalculationRequest::from_json(json).unwrap();
        assert_eq!(request.mode, CalculationMode::Standard);
        assert_eq!(request.interest, InterestTerms::civil_code_default());
        assert!(request.installments.is_empty());
    }
}

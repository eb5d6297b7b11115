use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate, CURRENCY_SCALE};
use crate::errors::{CorrectionError, Result};
use crate::types::{InterestType, Periodicity};

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// decimal places of every emitted currency value
    pub currency_scale: u32,
    /// rounding applied when a currency value is emitted
    pub rounding: CurrencyRounding,
}

/// rounding applied to emitted currency values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CurrencyRounding {
    /// banker's rounding
    #[default]
    HalfEven,
    /// commercial rounding, used by some court tables
    HalfUp,
}

impl CurrencyRounding {
    fn strategy(&self) -> RoundingStrategy {
        match self {
            CurrencyRounding::HalfEven => RoundingStrategy::MidpointNearestEven,
            CurrencyRounding::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency_scale: CURRENCY_SCALE,
            rounding: CurrencyRounding::HalfEven,
        }
    }
}

impl EngineConfig {
    /// load configuration from json
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| CorrectionError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.currency_scale > 8 {
            return Err(CorrectionError::InvalidConfiguration {
                message: format!("currency scale {} exceeds 8 places", self.currency_scale),
            });
        }
        Ok(())
    }

    /// emit a raw value as currency
    pub fn money(&self, value: Decimal) -> Money {
        Money::round_with(value, self.currency_scale, self.rounding.strategy())
    }
}

/// interest terms of a standard calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestTerms {
    pub interest_type: InterestType,
    /// percent per periodicity unit
    pub rate: Rate,
    pub periodicity: Periodicity,
    /// accrue on the corrected value instead of the original one
    pub on_corrected_value: bool,
}

impl Default for InterestTerms {
    fn default() -> Self {
        Self::none()
    }
}

impl InterestTerms {
    /// no interest
    pub fn none() -> Self {
        Self {
            interest_type: InterestType::Simple,
            rate: Rate::ZERO,
            periodicity: Periodicity::Monthly,
            on_corrected_value: true,
        }
    }

    /// 1% per month simple interest on the corrected value (civil code default)
    pub fn civil_code_default() -> Self {
        Self {
            interest_type: InterestType::Simple,
            rate: Rate::from_percentage(1),
            periodicity: Periodicity::Monthly,
            on_corrected_value: true,
        }
    }

    /// 0.5% per month simple interest (savings account rate)
    pub fn savings_rate() -> Self {
        Self {
            interest_type: InterestType::Simple,
            rate: Rate::from_percent(dec!(0.5)),
            periodicity: Periodicity::Monthly,
            on_corrected_value: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate.is_negative() {
            return Err(CorrectionError::InvalidRate {
                field: "interest rate".to_string(),
                rate: self.rate,
            });
        }
        Ok(())
    }
}

/// penalty and legal fee percentages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SurchargeTerms {
    pub multa_percent: Rate,
    pub honorarios_percent: Rate,
}

impl SurchargeTerms {
    pub fn new(multa_percent: Rate, honorarios_percent: Rate) -> Self {
        Self {
            multa_percent,
            honorarios_percent,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.multa_percent.is_negative() {
            return Err(CorrectionError::InvalidRate {
                field: "multa".to_string(),
                rate: self.multa_percent,
            });
        }
        if self.honorarios_percent.is_negative() {
            return Err(CorrectionError::InvalidRate {
                field: "honorarios".to_string(),
                rate: self.honorarios_percent,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_rounds_half_even_to_cents() {
        let config = EngineConfig::default();
        assert_eq!(config.money(dec!(10.125)).to_string(), "10.12");
    }

    #[test]
    fn test_config_from_json() {
        let config = EngineConfig::from_json(r#"{"currency_scale": 2, "rounding": "HalfUp"}"#).unwrap();
        assert_eq!(config.rounding, CurrencyRounding::HalfUp);
        assert_eq!(config.money(dec!(10.125)).to_string(), "10.13");

        let err = EngineConfig::from_json(r#"{"currency_scale": 12, "rounding": "HalfEven"}"#);
        assert!(matches!(err, Err(CorrectionError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_interest_presets() {
        assert!(InterestTerms::none().rate.is_zero());
        assert_eq!(InterestTerms::civil_code_default().rate, Rate::from_percentage(1));
        assert_eq!(InterestTerms::savings_rate().rate.as_fraction(), dec!(0.005));
    }

    #[test]
    fn test_negative_rates_rejected() {
        let terms = InterestTerms {
            rate: Rate::from_percent(dec!(-1)),
            ..InterestTerms::civil_code_default()
        };
        assert!(matches!(terms.validate(), Err(CorrectionError::InvalidRate { .. })));

        let surcharges = SurchargeTerms::new(Rate::ZERO, Rate::from_percent(dec!(-10)));
        assert!(matches!(
            surcharges.validate(),
            Err(CorrectionError::InvalidRate { field, .. }) if field == "honorarios"
        ));
    }
}

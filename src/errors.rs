use chrono::NaiveDate;
use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::Competence;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrectionError {
    #[error("invalid range: {message}")]
    InvalidRange {
        message: String,
    },

    #[error("missing index data: {table} has no published value for {competence}")]
    MissingIndexData {
        table: String,
        competence: Competence,
    },

    #[error("invalid rate for {field}: {rate}")]
    InvalidRate {
        field: String,
        rate: Rate,
    },

    #[error("no legislative era covers {date}")]
    UnknownEra {
        date: NaiveDate,
    },

    #[error("invalid amount for {field}: {amount}")]
    InvalidAmount {
        field: String,
        amount: Money,
    },

    #[error("unknown index table: {reference}")]
    UnknownIndexTable {
        reference: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("calculation overflow: {message}")]
    CalculationOverflow {
        message: String,
    },

    #[error("import failed: {message}")]
    Import {
        message: String,
    },

    #[error("installment #{index} ({description}): {source}")]
    InInstallment {
        index: usize,
        description: String,
        #[source]
        source: Box<CorrectionError>,
    },
}

impl CorrectionError {
    /// wrap an error with the installment that triggered it
    pub fn in_installment(self, index: usize, description: &str) -> Self {
        CorrectionError::InInstallment {
            index,
            description: description.to_string(),
            source: Box::new(self),
        }
    }

    /// innermost error, skipping installment context
    pub fn root_cause(&self) -> &CorrectionError {
        match self {
            CorrectionError::InInstallment { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CorrectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_installment_context() {
        let missing = CorrectionError::MissingIndexData {
            table: "IPCA-E".to_string(),
            competence: Competence::new(2024, 4).unwrap(),
        };
        let wrapped = missing.clone().in_installment(2, "parcela 3");

        assert_eq!(wrapped.root_cause(), &missing);
        assert_eq!(
            wrapped.to_string(),
            "installment #2 (parcela 3): missing index data: IPCA-E has no published value for 2024-04"
        );
    }
}

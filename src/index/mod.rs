pub mod import;
pub mod store;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{CorrectionError, Result};
use crate::types::{Competence, IndexKind, IndexTableId, Provenance};

pub use import::{ImportReport, IndexImporter};
pub use store::{IndexStore, PublishOutcome};

/// a published index series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexTable {
    pub id: IndexTableId,
    /// unique code, e.g. "IPCA-E"
    pub name: String,
    pub description: String,
    /// official series code at the publishing agency
    pub official_code: Option<String>,
    pub kind: IndexKind,
    pub provenance: Provenance,
}

/// one published value of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexValue {
    pub table_id: IndexTableId,
    pub competence: Competence,
    pub value: Decimal,
    pub provenance: Provenance,
}

/// Read-only view over index data supplied by the ingestion side.
///
/// Implementations must return the same answer for the same snapshot; the
/// engine never writes through this trait.
pub trait IndexSource: Send + Sync {
    fn table(&self, id: IndexTableId) -> Option<&IndexTable>;

    fn find_table(&self, name: &str) -> Option<&IndexTable>;

    fn value_at(&self, table: IndexTableId, competence: Competence) -> Option<Decimal>;

    fn list_tables(&self) -> Vec<&IndexTable>;
}

/// monthly lookups over an index source that fail closed on gaps
#[derive(Clone, Copy)]
pub struct IndexSeries<'a> {
    source: &'a dyn IndexSource,
}

impl<'a> IndexSeries<'a> {
    pub fn new(source: &'a dyn IndexSource) -> Self {
        Self { source }
    }

    pub fn table(&self, id: IndexTableId) -> Result<&'a IndexTable> {
        self.source
            .table(id)
            .ok_or_else(|| CorrectionError::UnknownIndexTable {
                reference: id.to_string(),
            })
    }

    pub fn find_table(&self, name: &str) -> Result<&'a IndexTable> {
        self.source
            .find_table(name)
            .ok_or_else(|| CorrectionError::UnknownIndexTable {
                reference: name.to_string(),
            })
    }

    /// published value, `MissingIndexData` when absent
    pub fn value_at(&self, table: &IndexTable, competence: Competence) -> Result<Decimal> {
        self.source
            .value_at(table.id, competence)
            .ok_or_else(|| CorrectionError::MissingIndexData {
                table: table.name.clone(),
                competence,
            })
    }

    /// Variation of one month as a fraction (0.0042 for 0.42%).
    pub fn monthly_variation(&self, table: &IndexTable, competence: Competence) -> Result<Decimal> {
        let value = self.value_at(table, competence)?;
        match table.kind {
            IndexKind::MonthlyRate => Ok(value / Decimal::ONE_HUNDRED),
            IndexKind::NumberIndex => {
                let previous = self.value_at(table, competence.previous())?;
                if previous.is_zero() {
                    return Err(CorrectionError::InvalidConfiguration {
                        message: format!(
                            "{} has a zero index number at {}",
                            table.name,
                            competence.previous()
                        ),
                    });
                }
                Ok(value / previous - Decimal::ONE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn competence(y: i32, m: u32) -> Competence {
        Competence::new(y, m).unwrap()
    }

    #[test]
    fn test_monthly_rate_variation() {
        let mut store = IndexStore::new();
        let id = store
            .create_table("IPCA-E", "IPCA especial", IndexKind::MonthlyRate, Provenance::Manual)
            .unwrap();
        store.publish(id, competence(2024, 1), dec!(0.42), Provenance::Manual).unwrap();

        let series = IndexSeries::new(&store);
        let table = series.table(id).unwrap();
        assert_eq!(series.monthly_variation(table, competence(2024, 1)).unwrap(), dec!(0.0042));
    }

    #[test]
    fn test_number_index_variation_uses_previous_month() {
        let mut store = IndexStore::new();
        let id = store
            .create_table("IGP-M", "numero indice", IndexKind::NumberIndex, Provenance::Imported)
            .unwrap();
        store.publish(id, competence(2023, 12), dec!(100), Provenance::Imported).unwrap();
        store.publish(id, competence(2024, 1), dec!(101), Provenance::Imported).unwrap();

        let series = IndexSeries::new(&store);
        let table = series.table(id).unwrap();
        assert_eq!(series.monthly_variation(table, competence(2024, 1)).unwrap(), dec!(0.01));

        // the first published month has no predecessor
        let err = series.monthly_variation(table, competence(2023, 12)).unwrap_err();
        assert_eq!(
            err,
            CorrectionError::MissingIndexData {
                table: "IGP-M".to_string(),
                competence: competence(2023, 11),
            }
        );
    }

    #[test]
    fn test_unknown_table() {
        let store = IndexStore::new();
        let series = IndexSeries::new(&store);
        assert!(matches!(
            series.find_table("SELIC"),
            Err(CorrectionError::UnknownIndexTable { .. })
        ));
    }
}

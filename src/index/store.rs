use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CorrectionError, Result};
use crate::index::{IndexSource, IndexTable, IndexValue};
use crate::types::{Competence, IndexKind, IndexTableId, Provenance};

/// result of publishing a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Inserted,
    Updated,
}

/// In-memory snapshot of index tables and their values.
///
/// Mutated only by ingestion; calculations borrow it immutably, so any number
/// of them can share one snapshot across threads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStore {
    tables: BTreeMap<IndexTableId, IndexTable>,
    values: BTreeMap<IndexTableId, BTreeMap<Competence, IndexValue>>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// register a table, names must be unique
    pub fn add_table(&mut self, table: IndexTable) -> Result<IndexTableId> {
        if self.find_table(&table.name).is_some() {
            return Err(CorrectionError::InvalidConfiguration {
                message: format!("index table {} already exists", table.name),
            });
        }
        let id = table.id;
        self.tables.insert(id, table);
        self.values.entry(id).or_default();
        Ok(id)
    }

    /// create and register a table with a fresh id
    pub fn create_table(
        &mut self,
        name: &str,
        description: &str,
        kind: IndexKind,
        provenance: Provenance,
    ) -> Result<IndexTableId> {
        self.add_table(IndexTable {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            official_code: None,
            kind,
            provenance,
        })
    }

    /// insert or replace the value of a competence
    pub fn publish(
        &mut self,
        table: IndexTableId,
        competence: Competence,
        value: Decimal,
        provenance: Provenance,
    ) -> Result<PublishOutcome> {
        let series = self
            .values
            .get_mut(&table)
            .ok_or_else(|| CorrectionError::UnknownIndexTable {
                reference: table.to_string(),
            })?;

        let previous = series.insert(
            competence,
            IndexValue {
                table_id: table,
                competence,
                value,
                provenance,
            },
        );

        Ok(match previous {
            Some(_) => PublishOutcome::Updated,
            None => PublishOutcome::Inserted,
        })
    }

    /// values between two competences, inclusive, in order
    pub fn values_between(
        &self,
        table: IndexTableId,
        from: Competence,
        to: Competence,
    ) -> Vec<&IndexValue> {
        match self.values.get(&table) {
            Some(series) if from <= to => series.range(from..=to).map(|(_, v)| v).collect(),
            _ => Vec::new(),
        }
    }

    /// last published competence of a table
    pub fn latest_competence(&self, table: IndexTableId) -> Option<Competence> {
        self.values
            .get(&table)
            .and_then(|series| series.keys().next_back().copied())
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    /// load a snapshot previously written with `to_json_pretty`
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CorrectionError::InvalidConfiguration {
            message: format!("invalid index snapshot: {}", e),
        })
    }
}

impl IndexSource for IndexStore {
    fn table(&self, id: IndexTableId) -> Option<&IndexTable> {
        self.tables.get(&id)
    }

    fn find_table(&self, name: &str) -> Option<&IndexTable> {
        self.tables.values().find(|t| t.name == name)
    }

    fn value_at(&self, table: IndexTableId, competence: Competence) -> Option<Decimal> {
        self.values
            .get(&table)
            .and_then(|series| series.get(&competence))
            .map(|v| v.value)
    }

    fn list_tables(&self) -> Vec<&IndexTable> {
        let mut tables: Vec<&IndexTable> = self.tables.values().collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        tables
    }
}

pub mod config;
pub mod correction;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod index;
pub mod installments;
pub mod interest;
pub mod legislation;
pub mod regime;
pub mod report;
pub mod request;
pub mod result;
pub mod surcharge;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

// re-export key types
pub use config::{CurrencyRounding, EngineConfig, InterestTerms, SurchargeTerms};
pub use correction::{AccumulatedPeriod, MonthVariation, PeriodAccumulator};
pub use decimal::{Money, Rate};
pub use engine::CalculationEngine;
pub use errors::{CorrectionError, Result};
pub use events::{Event, EventStore};
pub use index::{
    ImportReport, IndexImporter, IndexSeries, IndexSource, IndexStore, IndexTable, IndexValue,
    PublishOutcome,
};
pub use installments::{Installment, InstallmentResolver};
pub use interest::{AccrualEngine, CompoundingEngine, InterestCalculation, InterestCalculator};
pub use legislation::{CorrectionRule, InterestRule, LegislativeEra, LegislativeRuleTable};
pub use regime::{InterestModel, RegimeStrategy};
pub use report::{EvolutionReport, EvolutionReportBuilder};
pub use request::{CalculationRequest, CalculationRequestBuilder};
pub use result::{CalculationResult, InstallmentResult, MonthEntry};
pub use surcharge::{SurchargeApplier, Surcharges};
pub use types::{
    CalculationMode, Competence, IndexKind, IndexTableId, InterestType, Periodicity, Provenance,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

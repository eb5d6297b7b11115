pub mod evolution;
pub mod serialization;

pub use evolution::EvolutionReportBuilder;
pub use serialization::{EvolutionReport, IndexChangeView, TotalsView};

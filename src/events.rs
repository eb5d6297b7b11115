use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{CalculationMode, Competence};

/// audit trail events emitted while a calculation runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    CalculationStarted {
        mode: CalculationMode,
        start_date: NaiveDate,
        end_date: NaiveDate,
        installments: usize,
    },
    InstallmentResolved {
        index: usize,
        description: String,
        applied_index_name: Option<String>,
        correction_factor: Decimal,
        corrected_value: Money,
        interest_value: Money,
    },
    InstallmentNotYetDue {
        index: usize,
        description: String,
        due_date: NaiveDate,
    },
    IndexChanged {
        competence: Competence,
        from: String,
        to: String,
    },
    SurchargesApplied {
        base: Money,
        multa: Money,
        honorarios: Money,
    },
    CalculationCompleted {
        corrected_value: Money,
        interest_value: Money,
        total_value: Money,
    },
}

/// event store for collecting events during a calculation
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

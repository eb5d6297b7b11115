//! shared test data

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::index::IndexStore;
use crate::legislation::{INPC, IPCA, IPCA_E, SELIC};
use crate::types::{Competence, IndexKind, IndexTableId, Provenance};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn competence(y: i32, m: u32) -> Competence {
    Competence::new(y, m).unwrap()
}

/// publish `value` for every competence from `from` to `to`, inclusive
pub fn publish_flat(store: &mut IndexStore, table: IndexTableId, value: Decimal, from: Competence, to: Competence) {
    let mut current = from;
    while current <= to {
        store.publish(table, current, value, Provenance::Manual).unwrap();
        current = current.next();
    }
}

/// one monthly-rate table with the same rate for every month of 2020..=2026
pub fn flat_store(name: &str, percent: Decimal) -> (IndexStore, IndexTableId) {
    let mut store = IndexStore::new();
    let id = store
        .create_table(name, "flat test series", IndexKind::MonthlyRate, Provenance::Manual)
        .unwrap();
    publish_flat(&mut store, id, percent, competence(2020, 1), competence(2026, 12));
    (store, id)
}

/// legislative tables with constant rates: INPC 0.5%, IPCA-E 0.4%, IPCA 0.3%
/// and the given SELIC rate
pub fn treasury_store_with_selic(selic: Decimal) -> IndexStore {
    let mut store = IndexStore::new();
    let from = competence(1983, 12);
    let to = competence(2026, 12);

    for (name, value) in [(INPC, dec!(0.5)), (IPCA_E, dec!(0.4)), (IPCA, dec!(0.3)), (SELIC, selic)] {
        let id = store
            .create_table(name, name, IndexKind::MonthlyRate, Provenance::Manual)
            .unwrap();
        publish_flat(&mut store, id, value, from, to);
    }
    store
}

pub fn treasury_store() -> IndexStore {
    treasury_store_with_selic(dec!(0.8))
}

/// public treasury debt crossing the EC 113/2021 transition
use monetary_correction_rs::chrono::NaiveDate;
use monetary_correction_rs::report::EvolutionReport;
use monetary_correction_rs::{
    CalculationEngine, CalculationRequest, Competence, IndexKind, IndexStore,
    LegislativeRuleTable, Money, Provenance,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn publish_range(
    store: &mut IndexStore,
    name: &str,
    value: Decimal,
    from: Competence,
    to: Competence,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = store.create_table(name, name, IndexKind::MonthlyRate, Provenance::Manual)?;
    let mut current = from;
    while current <= to {
        store.publish(id, current, value, Provenance::Manual)?;
        current = current.next();
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let from = Competence::new(2021, 1).ok_or("bad competence")?;
    let to = Competence::new(2022, 12).ok_or("bad competence")?;

    let mut store = IndexStore::new();
    publish_range(&mut store, "IPCA-E", dec!(0.72), from, to)?;
    publish_range(&mut store, "SELIC", dec!(0.76), from, to)?;

    let request = CalculationRequest::builder()
        .title("Precatorio 0002")
        .principal(Money::from_major(50_000))
        .start_date(NaiveDate::from_ymd_opt(2021, 6, 1).ok_or("bad date")?)
        .end_date(NaiveDate::from_ymd_opt(2022, 6, 1).ok_or("bad date")?)
        .public_treasury()
        .build()?;

    let rules = LegislativeRuleTable::federal_public_treasury();
    let result = CalculationEngine::new(&store, &rules).calculate(&request)?;

    for change in result.index_changes() {
        println!("{}: index switched to {}", change.competence, change.applied_index_name);
    }
    println!("{}", EvolutionReport::from_result(&result).to_json_pretty()?);

    Ok(())
}

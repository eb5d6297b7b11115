/// quick start - correct a debt by one index with 1% monthly interest
use monetary_correction_rs::chrono::NaiveDate;
use monetary_correction_rs::{
    CalculationEngine, CalculationRequest, IndexKind, IndexStore, InterestTerms,
    LegislativeRuleTable, Money, Provenance, Rate,
};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // a small INPC series, published as monthly percentages
    let mut store = IndexStore::new();
    let inpc = store.create_table("INPC", "INPC/IBGE", IndexKind::MonthlyRate, Provenance::Manual)?;
    let csv = "competencia;valor\n2024-01;0,57\n2024-02;0,81\n2024-03;0,19\n2024-04;0,37\n2024-05;0,46\n2024-06;0,25\n";
    let report = monetary_correction_rs::IndexImporter::import(&mut store, inpc, csv.as_bytes())?;
    println!("imported {} values", report.imported);

    let request = CalculationRequest::builder()
        .title("Cobranca 0001")
        .principal(Money::from_major(10_000))
        .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?)
        .end_date(NaiveDate::from_ymd_opt(2024, 7, 1).ok_or("bad date")?)
        .index_table(inpc)
        .interest(InterestTerms::civil_code_default())
        .multa(Rate::from_percentage(2))
        .honorarios(Rate::from_percent(dec!(10)))
        .build()?;

    let rules = LegislativeRuleTable::federal_public_treasury();
    let engine = CalculationEngine::new(&store, &rules);
    let result = engine.calculate(&request)?;

    println!("{}", result.json());

    Ok(())
}

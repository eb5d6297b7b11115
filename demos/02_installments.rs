/// installments with their own due dates, one of them on its own index
use monetary_correction_rs::chrono::{NaiveDate, TimeZone, Utc};
use monetary_correction_rs::{
    CalculationEngine, CalculationRequest, Competence, IndexKind, IndexStore, Installment,
    InterestType, LegislativeRuleTable, Money, Periodicity, Provenance, Rate, SafeTimeProvider,
    TimeSource,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    Ok(NaiveDate::from_ymd_opt(y, m, d).ok_or("bad date")?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut store = IndexStore::new();
    let ipca = store.create_table("IPCA", "IPCA/IBGE", IndexKind::MonthlyRate, Provenance::Imported)?;
    let igpm = store.create_table("IGP-M", "IGP-M/FGV", IndexKind::NumberIndex, Provenance::Imported)?;

    let mut number = dec!(1000);
    let mut month = Competence::new(2023, 12).ok_or("bad competence")?;
    while month <= Competence::new(2024, 12).ok_or("bad competence")? {
        store.publish(ipca, month, dec!(0.4), Provenance::Imported)?;
        store.publish(igpm, month, number, Provenance::Imported)?;
        number = (number * dec!(1.003)).round_dp(4);
        month = month.next();
    }

    // the end date comes from the clock
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).single().ok_or("bad time")?,
    ));

    let request = CalculationRequest::builder()
        .title("Aluguéis em atraso")
        .principal(Money::ZERO)
        .start_date(date(2024, 1, 1)?)
        .index_table(ipca)
        .interest_rate(Rate::from_percent(Decimal::ONE), InterestType::Simple, Periodicity::Monthly)
        .multa(Rate::from_percentage(10))
        .installment(Installment::new("aluguel jan", Money::from_major(2_500), date(2024, 1, 10)?))
        .installment(Installment::new("aluguel fev", Money::from_major(2_500), date(2024, 2, 10)?))
        .installment(
            Installment::new("condominio mar", Money::from_major(800), date(2024, 3, 10)?)
                .with_index_table(igpm),
        )
        .installment(Installment::new("aluguel nov", Money::from_major(2_500), date(2024, 11, 10)?))
        .set_time(&time)
        .build()?;

    let rules = LegislativeRuleTable::federal_public_treasury();
    let result = CalculationEngine::new(&store, &rules).calculate(&request)?;

    for installment in &result.per_installment {
        println!(
            "{:<16} {:>10} -> {:>10} + {:>8} ({})",
            installment.description,
            installment.original_value,
            installment.corrected_value,
            installment.interest_value,
            installment.applied_index_name.as_deref().unwrap_or("not yet due"),
        );
    }
    println!("total: {}", result.total_value);

    Ok(())
}

use std::io::Read;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{CorrectionError, Result};
use crate::index::store::{IndexStore, PublishOutcome};
use crate::index::IndexSource;
use crate::types::{Competence, IndexTableId, Provenance};

/// outcome of a csv import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub updated: usize,
    /// one message per rejected line
    pub errors: Vec<String>,
}

/// Loads `competence,value` rows into an index store.
///
/// Accepts `,`, `;` or tab separated files with an optional header row.
/// Competences may be written as `YYYY-MM`, `MM/YYYY`, `YYYY-MM-DD` or
/// `DD/MM/YYYY`; values may use a decimal comma with dotted thousands.
pub struct IndexImporter;

impl IndexImporter {
    pub fn import<R: Read>(
        store: &mut IndexStore,
        table: IndexTableId,
        mut reader: R,
    ) -> Result<ImportReport> {
        let table_name = store
            .table(table)
            .map(|t| t.name.clone())
            .ok_or_else(|| CorrectionError::UnknownIndexTable {
                reference: table.to_string(),
            })?;

        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| CorrectionError::Import {
                message: e.to_string(),
            })?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(detect_delimiter(&text))
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut report = ImportReport::default();
        let mut first_row = true;

        for record in csv_reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    report.errors.push(e.to_string());
                    continue;
                }
            };
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            if first_row {
                first_row = false;
                if is_header(record.get(0).unwrap_or("")) {
                    continue;
                }
            }

            let row = match (record.get(0), record.get(1)) {
                (Some(competence), Some(value)) => parse_competence(competence)
                    .and_then(|c| parse_value(value).map(|v| (c, v))),
                _ => Err("expected competence and value".to_string()),
            };

            match row {
                Ok((competence, value)) => {
                    match store.publish(table, competence, value, Provenance::Imported)? {
                        PublishOutcome::Inserted => report.imported += 1,
                        PublishOutcome::Updated => report.updated += 1,
                    }
                }
                Err(message) => {
                    warn!(table = %table_name, line, %message, "rejected index row");
                    report.errors.push(format!("line {}: {}", line, message));
                }
            }
        }

        info!(
            table = %table_name,
            imported = report.imported,
            updated = report.updated,
            errors = report.errors.len(),
            "index import finished"
        );

        Ok(report)
    }
}

fn detect_delimiter(text: &str) -> u8 {
    let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if first.contains(';') {
        b';'
    } else if first.contains('\t') {
        b'\t'
    } else {
        b','
    }
}

fn is_header(field: &str) -> bool {
    let lower = field.to_lowercase();
    lower.contains("compet") || lower.contains("data") || lower.contains("date") || lower.contains("month")
}

fn parse_competence(raw: &str) -> std::result::Result<Competence, String> {
    let raw = raw.trim();
    let candidates = [
        (raw.to_string(), "%Y-%m-%d"),
        (raw.to_string(), "%d/%m/%Y"),
        (format!("{}-01", raw), "%Y-%m-%d"),
        (format!("01/{}", raw), "%d/%m/%Y"),
    ];

    candidates
        .iter()
        .find_map(|(text, format)| NaiveDate::parse_from_str(text, format).ok())
        .map(Competence::from_date)
        .ok_or_else(|| format!("invalid competence: {}", raw))
}

/// Parses `0.42`, `0,42` or `1.234,56`.
///
/// Mixed separators must be dotted thousands before a decimal comma; a lone
/// comma followed by three digits could be either and is refused.
fn parse_value(raw: &str) -> std::result::Result<Decimal, String> {
    let raw = raw.trim();
    let invalid = || format!("invalid value: {}", raw);

    let cleaned = match raw.rfind(',') {
        None => raw.to_string(),
        Some(comma) => {
            let (whole, fraction) = (&raw[..comma], &raw[comma + 1..]);
            if fraction.contains('.') || whole.contains(',') {
                return Err(invalid());
            }
            if whole.contains('.') {
                if !is_dotted_thousands(whole) {
                    return Err(invalid());
                }
            } else if is_thousands_group(fraction) && is_dotted_thousands(whole) && !is_zero_whole(whole) {
                return Err(format!("ambiguous separator in value: {}", raw));
            }
            format!("{}.{}", whole.replace('.', ""), fraction)
        }
    };

    Decimal::from_str(&cleaned).map_err(|_| invalid())
}

fn is_thousands_group(digits: &str) -> bool {
    digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_zero_whole(whole: &str) -> bool {
    whole.trim_start_matches(['-', '+']).trim_start_matches('0').is_empty()
}

fn is_dotted_thousands(whole: &str) -> bool {
    let mut groups = whole.trim_start_matches(['-', '+']).split('.');
    let leading = groups.next().unwrap_or("");
    (1..=3).contains(&leading.len())
        && leading.bytes().all(|b| b.is_ascii_digit())
        && groups.all(is_thousands_group)
}

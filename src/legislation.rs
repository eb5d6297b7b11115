use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{CorrectionError, Result};
use crate::types::Competence;

pub const INPC: &str = "INPC";
pub const IPCA_E: &str = "IPCA-E";
pub const IPCA: &str = "IPCA";
pub const SELIC: &str = "SELIC";

/// how the monetary correction of an era is obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CorrectionRule {
    /// correct by a single index table, referenced by name
    Index(String),
    /// correct by `index` plus an annual premium, never exceeding `cap` in a month
    CappedPremium {
        index: String,
        annual_premium: Rate,
        cap: String,
    },
}

impl CorrectionRule {
    pub fn index_name(&self) -> &str {
        match self {
            CorrectionRule::Index(name) => name,
            CorrectionRule::CappedPremium { index, .. } => index,
        }
    }
}

/// moratory interest of an era
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InterestRule {
    /// simple interest at a fixed percentage per month
    MonthlySimple(Rate),
    /// no separate interest line, the correction rate already includes it
    FoldedIntoCorrection,
}

impl InterestRule {
    pub fn monthly_rate(&self) -> Option<Rate> {
        match self {
            InterestRule::MonthlySimple(rate) => Some(*rate),
            InterestRule::FoldedIntoCorrection => None,
        }
    }
}

/// a period during which one correction index and one interest rule apply by law
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegislativeEra {
    /// legal basis, e.g. "EC 113/2021"
    pub label: String,
    pub valid_from: NaiveDate,
    /// exclusive; None for the era still in force
    pub valid_to: Option<NaiveDate>,
    pub correction: CorrectionRule,
    pub interest: InterestRule,
}

impl LegislativeEra {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.valid_from && self.valid_to.map_or(true, |to| date < to)
    }
}

/// Ordered, contiguous table of legislative eras.
///
/// Deserialized tables are checked the same way as those built with `new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRuleTable")]
pub struct LegislativeRuleTable {
    pub version: String,
    eras: Vec<LegislativeEra>,
}

#[derive(Deserialize)]
struct RawRuleTable {
    version: String,
    eras: Vec<LegislativeEra>,
}

impl TryFrom<RawRuleTable> for LegislativeRuleTable {
    type Error = CorrectionError;

    fn try_from(raw: RawRuleTable) -> Result<Self> {
        LegislativeRuleTable::new(&raw.version, raw.eras)
    }
}

impl LegislativeRuleTable {
    /// build a table, rejecting gaps, overlaps and unordered eras
    pub fn new(version: &str, eras: Vec<LegislativeEra>) -> Result<Self> {
        if eras.is_empty() {
            return Err(CorrectionError::InvalidConfiguration {
                message: "legislative table has no eras".to_string(),
            });
        }

        for era in &eras {
            if let Some(to) = era.valid_to {
                if to <= era.valid_from {
                    return Err(CorrectionError::InvalidConfiguration {
                        message: format!("era {} ends before it starts", era.label),
                    });
                }
            }
        }

        for pair in eras.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            match current.valid_to {
                Some(to) if to == next.valid_from => {}
                Some(to) if to < next.valid_from => {
                    return Err(CorrectionError::InvalidConfiguration {
                        message: format!(
                            "gap between {} and {}: {} to {}",
                            current.label, next.label, to, next.valid_from
                        ),
                    });
                }
                _ => {
                    return Err(CorrectionError::InvalidConfiguration {
                        message: format!("{} overlaps {}", current.label, next.label),
                    });
                }
            }
        }

        Ok(Self {
            version: version.to_string(),
            eras,
        })
    }

    /// federal public treasury regimes (INPC, IPCA-E, SELIC, IPCA + 2% capped at SELIC)
    pub fn federal_public_treasury() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        let eras = vec![
            LegislativeEra {
                label: "Lei 8.177/91".to_string(),
                valid_from: date(1984, 1, 1),
                valid_to: Some(date(1992, 1, 1)),
                correction: CorrectionRule::Index(INPC.to_string()),
                interest: InterestRule::MonthlySimple(Rate::from_percentage(1)),
            },
            LegislativeEra {
                label: "Manual de Calculos da JF".to_string(),
                valid_from: date(1992, 1, 1),
                valid_to: Some(date(2009, 7, 1)),
                correction: CorrectionRule::Index(IPCA_E.to_string()),
                interest: InterestRule::MonthlySimple(Rate::from_percentage(1)),
            },
            LegislativeEra {
                label: "Lei 11.960/2009".to_string(),
                valid_from: date(2009, 7, 1),
                valid_to: Some(date(2021, 12, 9)),
                correction: CorrectionRule::Index(IPCA_E.to_string()),
                interest: InterestRule::MonthlySimple(Rate::from_percent(dec!(0.5))),
            },
            LegislativeEra {
                label: "EC 113/2021".to_string(),
                valid_from: date(2021, 12, 9),
                valid_to: Some(date(2025, 10, 1)),
                correction: CorrectionRule::Index(SELIC.to_string()),
                interest: InterestRule::FoldedIntoCorrection,
            },
            LegislativeEra {
                label: "EC 136/2025".to_string(),
                valid_from: date(2025, 10, 1),
                valid_to: None,
                correction: CorrectionRule::CappedPremium {
                    index: IPCA.to_string(),
                    annual_premium: Rate::from_percentage(2),
                    cap: SELIC.to_string(),
                },
                interest: InterestRule::FoldedIntoCorrection,
            },
        ];

        Self {
            version: "federal-2025.10".to_string(),
            eras,
        }
    }

    /// load a table published as JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CorrectionError::InvalidConfiguration {
            message: format!("invalid legislative table: {}", e),
        })
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn eras(&self) -> &[LegislativeEra] {
        &self.eras
    }

    /// era in force on a date
    pub fn era_for(&self, date: NaiveDate) -> Result<&LegislativeEra> {
        self.eras
            .iter()
            .find(|era| era.contains(date))
            .ok_or(CorrectionError::UnknownEra { date })
    }

    /// Era governing a whole competence.
    ///
    /// An era starting mid-month governs that month, so the era in force on
    /// the month's last day is the one applied.
    pub fn era_for_competence(&self, competence: Competence) -> Result<&LegislativeEra> {
        self.era_for(competence.last_day())
    }
}

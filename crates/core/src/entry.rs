use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which ledger a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Internal,
    Bank,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Internal => write!(f, "internal"),
            Origin::Bank => write!(f, "bank"),
        }
    }
}

/// Identifier of a record, unique within its origin collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId(s)
    }
}

/// A parsed ledger row as handed over by the ingestion layer. Dates and
/// amounts are already typed; nothing about vendor text has been touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: RecordId,
    pub date: NaiveDate,
    pub vendor: Option<String>,
    pub amount: Decimal,
}

impl LedgerEntry {
    pub fn new(id: impl Into<RecordId>, date: NaiveDate, vendor: &str, amount: Decimal) -> Self {
        LedgerEntry {
            id: id.into(),
            date,
            vendor: Some(vendor.to_string()),
            amount,
        }
    }
}

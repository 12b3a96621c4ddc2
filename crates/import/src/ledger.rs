use chrono::{NaiveDate, NaiveDateTime};
use concord_core::{LedgerEntry, RecordId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Header names of the four columns a ledger export must provide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub id_column: String,
    pub date_column: String,
    pub vendor_column: String,
    pub amount_column: String,
    pub date_format: String,
    /// Resolve ambiguous dates such as `03/04/2024` as day/month.
    pub day_first: bool,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id_column: "Transaction_ID".to_string(),
            date_column: "Date".to_string(),
            vendor_column: "Vendor".to_string(),
            amount_column: "Amount".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            day_first: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerProfile {
    pub name: String,
    pub mapping: ColumnMapping,
    pub delimiter: String,
    /// Fold signed debits/credits to their magnitude.
    pub absolute_amounts: bool,
}

impl Default for LedgerProfile {
    fn default() -> Self {
        Self::internal_export()
    }
}

impl LedgerProfile {
    /// Accounting export: `Transaction_ID, Date, Vendor, Amount`.
    pub fn internal_export() -> Self {
        Self {
            name: "Internal export".to_string(),
            mapping: ColumnMapping::default(),
            delimiter: ",".to_string(),
            absolute_amounts: false,
        }
    }

    /// Bank statement export: `Bank_Ref, Date, Vendor_Name, Amount`.
    pub fn bank_statement() -> Self {
        Self {
            name: "Bank statement".to_string(),
            mapping: ColumnMapping {
                id_column: "Bank_Ref".to_string(),
                vendor_column: "Vendor_Name".to_string(),
                ..ColumnMapping::default()
            },
            delimiter: ",".to_string(),
            absolute_amounts: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Invalid date on line {line}: {value}")]
    InvalidDate { line: usize, value: String },
    #[error("Invalid amount on line {line}: {value}")]
    InvalidAmount { line: usize, value: String },
}

/// Column positions resolved against a header row.
struct ColumnIndex {
    id: usize,
    date: usize,
    vendor: Option<usize>,
    amount: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, mapping: &ColumnMapping) -> Result<Self, CsvError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| CsvError::MissingColumn(name.to_string()));
        Ok(Self {
            id: require(&mapping.id_column)?,
            date: require(&mapping.date_column)?,
            vendor: find(&mapping.vendor_column),
            amount: require(&mapping.amount_column)?,
        })
    }
}

pub struct LedgerImporter;

impl LedgerImporter {
    /// Reads every data row into a [`LedgerEntry`]. Rows missing an id, date
    /// or amount are skipped; cells that are present but unparseable fail the
    /// whole import.
    pub fn parse_profile<R: Read>(
        reader: &mut csv::Reader<R>,
        profile: &LedgerProfile,
    ) -> Result<Vec<LedgerEntry>, CsvError> {
        let mapping = &profile.mapping;
        let columns = ColumnIndex::resolve(reader.headers()?, mapping)?;
        let mut entries = Vec::new();
        let mut skipped = 0usize;

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            // Header is line 1.
            let line = row + 2;

            let cell = |col: usize| record.get(col).map(str::trim).unwrap_or_default();
            let (id, date, amount) = (cell(columns.id), cell(columns.date), cell(columns.amount));
            if id.is_empty() || date.is_empty() || amount.is_empty() {
                warn!(line, profile = %profile.name, "skipping row with missing id, date or amount");
                skipped += 1;
                continue;
            }

            let date = parse_date(date, &mapping.date_format, mapping.day_first).ok_or_else(|| {
                CsvError::InvalidDate {
                    line,
                    value: date.to_string(),
                }
            })?;
            let mut amount = parse_amount(amount).ok_or_else(|| CsvError::InvalidAmount {
                line,
                value: amount.to_string(),
            })?;
            if profile.absolute_amounts {
                amount = amount.abs();
            }

            let vendor = columns
                .vendor
                .map(cell)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            entries.push(LedgerEntry {
                id: RecordId(id.to_string()),
                date,
                vendor,
                amount,
            });
        }

        if entries.is_empty() {
            warn!(profile = %profile.name, skipped, "ledger has no usable rows");
        }

        debug!(profile = %profile.name, rows = entries.len(), skipped, "ledger parsed");
        Ok(entries)
    }
}

const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d", "%d %b %Y", "%d-%b-%Y",
];

const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%Y", "%m-%d-%Y", "%Y-%m-%d", "%Y/%m/%d", "%b %d, %Y", "%d %b %Y",
];

fn parse_date(s: &str, format: &str, day_first: bool) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, format) {
        return Some(date);
    }

    let fallbacks = if day_first {
        DAY_FIRST_FORMATS
    } else {
        MONTH_FIRST_FORMATS
    };
    if let Some(date) = fallbacks
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }

    // Spreadsheet exports sometimes carry a midnight timestamp.
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };
    let s = s.replace([',', '$', ' '], "");
    let dec = Decimal::from_str(&s).ok()?;
    Some(if negative { -dec } else { dec })
}

pub fn import_ledger<R: Read>(
    data: R,
    profile: &LedgerProfile,
) -> Result<Vec<LedgerEntry>, CsvError> {
    let delimiter = profile
        .delimiter
        .as_bytes()
        .first()
        .copied()
        .unwrap_or(b',');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data);

    LedgerImporter::parse_profile(&mut reader, profile)
}

pub fn import_ledger_file(path: &Path, profile: &LedgerProfile) -> Result<Vec<LedgerEntry>, CsvError> {
    let file = File::open(path)?;
    import_ledger(file, profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── parse_amount ──────────────────────────────────────────────────────────

    #[test]
    fn parse_amount_plain() {
        assert_eq!(parse_amount("123.45"), Some(dec("123.45")));
    }

    #[test]
    fn parse_amount_with_currency_and_commas() {
        assert_eq!(parse_amount("$1,234.56"), Some(dec("1234.56")));
    }

    #[test]
    fn parse_amount_accounting_parens() {
        assert_eq!(parse_amount("(75.25)"), Some(dec("-75.25")));
    }

    #[test]
    fn parse_amount_keeps_full_precision() {
        // Sub-cent precision is the engine's call to reject, not ours to round.
        assert_eq!(parse_amount("10.005"), Some(dec("10.005")));
    }

    #[test]
    fn parse_amount_invalid() {
        assert_eq!(parse_amount("not_a_number"), None);
        assert_eq!(parse_amount(""), None);
    }

    // ── parse_date ────────────────────────────────────────────────────────────

    #[test]
    fn parse_date_uses_profile_format_first() {
        assert_eq!(parse_date("2024-01-15", "%Y-%m-%d", true), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn parse_date_day_first_fallback() {
        assert_eq!(parse_date("10/01/2024", "%Y-%m-%d", true), Some(ymd(2024, 1, 10)));
        assert_eq!(parse_date("10.01.2024", "%Y-%m-%d", true), Some(ymd(2024, 1, 10)));
    }

    #[test]
    fn parse_date_month_first_fallback() {
        assert_eq!(parse_date("10/01/2024", "%Y-%m-%d", false), Some(ymd(2024, 10, 1)));
    }

    #[test]
    fn parse_date_drops_midnight_timestamp() {
        assert_eq!(
            parse_date("2024-01-15 00:00:00", "%Y-%m-%d", true),
            Some(ymd(2024, 1, 15))
        );
    }

    #[test]
    fn parse_date_invalid() {
        assert_eq!(parse_date("not-a-date", "%Y-%m-%d", true), None);
        assert_eq!(parse_date("31/02/2024", "%Y-%m-%d", true), None);
    }

    // ── full imports ──────────────────────────────────────────────────────────

    #[test]
    fn import_internal_export() {
        let data = b"Transaction_ID,Date,Vendor,Amount\nT1,10/01/2024,Staples Inc,100.00\nT2,2024-01-11,Uber,\"1,250.50\"\n";
        let entries = import_ledger(data.as_ref(), &LedgerProfile::internal_export()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id.as_str(), "T1");
        assert_eq!(entries[0].date, ymd(2024, 1, 10));
        assert_eq!(entries[0].vendor.as_deref(), Some("Staples Inc"));
        assert_eq!(entries[0].amount, dec("100.00"));
        assert_eq!(entries[1].amount, dec("1250.50"));
    }

    #[test]
    fn import_bank_statement_with_reordered_columns() {
        let data = b"Amount,Vendor_Name,Bank_Ref,Date\n100.00,STAPLES,B-1,11/01/2024\n";
        let entries = import_ledger(data.as_ref(), &LedgerProfile::bank_statement()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id.as_str(), "B-1");
        assert_eq!(entries[0].vendor.as_deref(), Some("STAPLES"));
        assert_eq!(entries[0].date, ymd(2024, 1, 11));
    }

    #[test]
    fn import_skips_rows_with_missing_cells() {
        let data = b"Transaction_ID,Date,Vendor,Amount\nT1,,Staples,10.00\nT2,2024-01-11,,5.00\n,2024-01-11,X,1.00\nT4,2024-01-12,Y,\n";
        let entries = import_ledger(data.as_ref(), &LedgerProfile::internal_export()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id.as_str(), "T2");
        assert_eq!(entries[0].vendor, None);
    }

    #[test]
    fn import_rejects_bad_amount_with_line_number() {
        let data = b"Transaction_ID,Date,Vendor,Amount\nT1,2024-01-10,A,1.00\nT2,2024-01-11,B,abc\n";
        let err = import_ledger(data.as_ref(), &LedgerProfile::internal_export()).unwrap_err();
        assert!(matches!(err, CsvError::InvalidAmount { line: 3, .. }), "{err}");
    }

    #[test]
    fn import_rejects_bad_date() {
        let data = b"Transaction_ID,Date,Vendor,Amount\nT1,someday,A,1.00\n";
        let err = import_ledger(data.as_ref(), &LedgerProfile::internal_export()).unwrap_err();
        assert!(matches!(err, CsvError::InvalidDate { line: 2, ref value } if value == "someday"));
    }

    #[test]
    fn import_missing_column_errors() {
        let data = b"Transaction_ID,Date,Amount\nT1,2024-01-10,1.00\n";
        let entries = import_ledger(data.as_ref(), &LedgerProfile::internal_export()).unwrap();
        // Vendor is optional.
        assert_eq!(entries[0].vendor, None);

        let data = b"Ref,Date,Vendor,Amount\nT1,2024-01-10,A,1.00\n";
        let err = import_ledger(data.as_ref(), &LedgerProfile::internal_export()).unwrap_err();
        assert!(matches!(err, CsvError::MissingColumn(ref c) if c == "Transaction_ID"));
    }

    #[test]
    fn import_header_only_is_empty() {
        let data = b"Bank_Ref,Date,Vendor_Name,Amount\n";
        let entries = import_ledger(data.as_ref(), &LedgerProfile::bank_statement()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn import_all_rows_skipped_is_empty() {
        let data = b"Transaction_ID,Date,Vendor,Amount\n,2024-01-10,A,1.00\nT2,,B,2.00\n";
        let entries = import_ledger(data.as_ref(), &LedgerProfile::internal_export()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn import_absolute_amounts_and_delimiter() {
        let data = b"Transaction_ID;Date;Vendor;Amount\nT1;2024-01-10;Refund;(42.00)\n";
        let profile = LedgerProfile {
            delimiter: ";".to_string(),
            absolute_amounts: true,
            ..LedgerProfile::internal_export()
        };
        let entries = import_ledger(data.as_ref(), &profile).unwrap();
        assert_eq!(entries[0].amount, dec("42.00"));
    }

    #[test]
    fn import_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Bank_Ref,Date,Vendor_Name,Amount").unwrap();
        writeln!(file, "B-9,2024-02-01,Zoom,15.99").unwrap();
        let entries = import_ledger_file(file.path(), &LedgerProfile::bank_statement()).unwrap();
        assert_eq!(entries[0].id.as_str(), "B-9");
    }
}

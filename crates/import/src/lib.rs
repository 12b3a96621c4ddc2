pub mod ledger;

pub use ledger::{
    import_ledger, import_ledger_file, ColumnMapping, CsvError, LedgerImporter, LedgerProfile,
};

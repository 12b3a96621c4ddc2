pub mod config;
pub mod entry;
pub mod error;
pub mod money;

pub use config::{MatchConfig, DEFAULT_STOPWORDS};
pub use entry::{LedgerEntry, Origin, RecordId};
pub use error::ReconError;
pub use money::Money;

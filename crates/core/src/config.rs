use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Tokens dropped from vendor names before comparison.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "inc", "llc", "ltd", "pvt", "co", "corp", "payment", "transfer", "online", "india",
];

/// Per-run matching parameters. Passed explicitly into every run; nothing
/// here is process-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Maximum absolute date distance in days (inclusive).
    pub date_tolerance_days: i64,
    /// Minimum vendor similarity, in `[0, 1]`, for a pair to be considered.
    pub similarity_threshold: f64,
    /// Width of an amount bucket. Only the same and adjacent buckets are searched.
    pub amount_bucket_width: Decimal,
    pub stopwords: Vec<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            date_tolerance_days: 2,
            similarity_threshold: 0.75,
            amount_bucket_width: Decimal::TEN,
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl MatchConfig {
    pub fn new(
        date_tolerance_days: i64,
        similarity_threshold: f64,
        amount_bucket_width: Decimal,
    ) -> Self {
        Self {
            date_tolerance_days,
            similarity_threshold,
            amount_bucket_width,
            ..Self::default()
        }
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, ReconError> {
        let config: MatchConfig =
            toml::from_str(toml_content).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.date_tolerance_days < 0 {
            return Err(ReconError::invalid_config(
                "date_tolerance_days",
                format!("must be >= 0, got {}", self.date_tolerance_days),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ReconError::invalid_config(
                "similarity_threshold",
                format!("must be within [0, 1], got {}", self.similarity_threshold),
            ));
        }
        if self.amount_bucket_width <= Decimal::ZERO {
            return Err(ReconError::invalid_config(
                "amount_bucket_width",
                format!("must be > 0, got {}", self.amount_bucket_width),
            ));
        }
        Ok(())
    }
}

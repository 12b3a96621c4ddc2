use thiserror::Error;

use crate::entry::{Origin, RecordId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconError {
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("Malformed {origin} record {id}: {field} {reason}")]
    MalformedRecord {
        origin: Origin,
        id: RecordId,
        field: &'static str,
        reason: String,
    },
    #[error("Duplicate {origin} record id: {id}")]
    DuplicateId { origin: Origin, id: RecordId },
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),
    #[error("Matching worker failed: {0}")]
    Worker(String),
}

impl ReconError {
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        ReconError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub fn malformed(
        origin: Origin,
        id: &RecordId,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        ReconError::MalformedRecord {
            origin,
            id: id.clone(),
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_record_names_record_and_field() {
        let err = ReconError::malformed(Origin::Bank, &"B-7".into(), "amount", "is negative");
        assert_eq!(err.to_string(), "Malformed bank record B-7: amount is negative");
    }

    #[test]
    fn invalid_config_names_field() {
        let err = ReconError::invalid_config("similarity_threshold", "must be within [0, 1]");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: similarity_threshold must be within [0, 1]"
        );
    }
}
